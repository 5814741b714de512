//! Bound executions and the lifecycle that drives them.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{status_of, ExecError};
use crate::graph::{Graph, NodeId};
use crate::ops::dispatch::select;
use crate::ops::{NodeOps, OpRegistry};

mod session;

pub use session::{Session, TraceEvent};

/// Lifecycle state of a bound node.
///
/// An unbound node has no `ExecNode` at all; binding is construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Bound,
    Initialized,
    Ready,
    Running,
    Finalized,
    Released,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeState::Bound => "bound",
            NodeState::Initialized => "initialized",
            NodeState::Ready => "ready",
            NodeState::Running => "running",
            NodeState::Finalized => "finalized",
            NodeState::Released => "released",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle operation issued against a bound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStep {
    Init,
    Prerun,
    Reshape,
    Run,
    Postrun,
    Release,
}

impl LifecycleStep {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStep::Init => "init",
            LifecycleStep::Prerun => "prerun",
            LifecycleStep::Reshape => "reshape",
            LifecycleStep::Run => "run",
            LifecycleStep::Postrun => "postrun",
            LifecycleStep::Release => "release",
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A graph node paired with the backend selected for it.
pub struct ExecNode {
    node: NodeId,
    ops: Arc<dyn NodeOps>,
    state: NodeState,
    ops_priv: Option<Box<dyn Any + Send>>,
}

impl fmt::Debug for ExecNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecNode")
            .field("node", &self.node)
            .field("ops", &self.ops.name())
            .field("state", &self.state)
            .finish()
    }
}

impl ExecNode {
    /// Select a backend for `node` and bind it.
    pub fn bind(registry: &OpRegistry, graph: &Graph, node: NodeId) -> Result<Self, ExecError> {
        let ir_node = graph.node(node)?;
        let ops = select(registry, graph, ir_node)?;
        Ok(Self::with_ops(node, ops))
    }

    /// Bind `node` to an explicitly chosen backend, bypassing scoring.
    pub fn with_ops(node: NodeId, ops: Arc<dyn NodeOps>) -> Self {
        Self {
            node,
            ops,
            state: NodeState::Bound,
            ops_priv: None,
        }
    }

    pub fn node_index(&self) -> NodeId {
        self.node
    }

    pub fn ops(&self) -> &Arc<dyn NodeOps> {
        &self.ops
    }

    pub fn backend_name(&self) -> &'static str {
        self.ops.name()
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Store backend private data for this node, replacing any previous value.
    pub fn set_priv<T: Any + Send>(&mut self, value: T) {
        self.ops_priv = Some(Box::new(value));
    }

    pub fn priv_ref<T: Any + Send>(&self) -> Option<&T> {
        self.ops_priv.as_ref()?.downcast_ref::<T>()
    }

    fn next_state(&self, step: LifecycleStep) -> Result<NodeState, ExecError> {
        use LifecycleStep as S;
        use NodeState as N;
        let next = match (step, self.state) {
            (S::Init, N::Bound) => N::Initialized,
            (S::Prerun, N::Initialized | N::Finalized) => N::Ready,
            (S::Reshape, N::Ready) => N::Ready,
            (S::Run, N::Ready) => N::Ready,
            (S::Postrun, N::Ready) => N::Finalized,
            (S::Release, state) if state != N::Released => N::Released,
            (step, state) => {
                return Err(ExecError::InvalidState {
                    node: self.node,
                    step,
                    state,
                })
            }
        };
        Ok(next)
    }

    pub fn init(&mut self, graph: &Graph) -> Result<(), ExecError> {
        let next = self.next_state(LifecycleStep::Init)?;
        let ops = Arc::clone(&self.ops);
        ops.init_node(self, graph)?;
        self.state = next;
        Ok(())
    }

    pub fn prerun(&mut self, graph: &mut Graph) -> Result<(), ExecError> {
        let next = self.next_state(LifecycleStep::Prerun)?;
        let ops = Arc::clone(&self.ops);
        ops.prerun(self, graph)?;
        self.state = next;
        Ok(())
    }

    /// Adapt to changed tensor shapes without re-binding.
    pub fn reshape(&mut self, graph: &mut Graph) -> Result<(), ExecError> {
        self.next_state(LifecycleStep::Reshape)?;
        let ops = Arc::clone(&self.ops);
        ops.reshape(self, graph)
    }

    /// Execute the node; the node is back in `Ready` afterwards, even on error.
    pub fn run(&mut self, graph: &mut Graph) -> Result<(), ExecError> {
        let next = self.next_state(LifecycleStep::Run)?;
        let ops = Arc::clone(&self.ops);
        self.state = NodeState::Running;
        let result = ops.run(self, graph);
        self.state = next;
        result
    }

    pub fn postrun(&mut self, graph: &mut Graph) -> Result<(), ExecError> {
        let next = self.next_state(LifecycleStep::Postrun)?;
        let ops = Arc::clone(&self.ops);
        ops.postrun(self, graph)?;
        self.state = next;
        Ok(())
    }

    /// Terminal step. The node is released even when the backend reports an
    /// error; private data is dropped either way.
    pub fn release(&mut self, graph: &Graph) -> Result<(), ExecError> {
        let next = self.next_state(LifecycleStep::Release)?;
        let ops = Arc::clone(&self.ops);
        let result = ops.release_node(self, graph);
        self.ops_priv = None;
        self.state = next;
        result
    }

    /// Status-code entry point: `0` on success, a negative code on failure.
    pub fn invoke(&mut self, step: LifecycleStep, graph: &mut Graph) -> i32 {
        let result = match step {
            LifecycleStep::Init => self.init(graph),
            LifecycleStep::Prerun => self.prerun(graph),
            LifecycleStep::Reshape => self.reshape(graph),
            LifecycleStep::Run => self.run(graph),
            LifecycleStep::Postrun => self.postrun(graph),
            LifecycleStep::Release => self.release(graph),
        };
        if let Err(err) = &result {
            crate::error!("node {} {} failed: {}", self.node, step, err);
        }
        status_of(&result)
    }
}
