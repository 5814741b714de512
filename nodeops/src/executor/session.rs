use std::time::Instant;

use crate::error::{status_of, ExecError};
use crate::graph::{describe_node, Graph, NodeId};
use crate::ops::registry::read_builtin;
use crate::ops::OpRegistry;

use super::{ExecNode, LifecycleStep, NodeState};

/// Execution record for one lifecycle call on one node.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub node_index: NodeId,
    pub node_desc: String,
    pub backend: &'static str,
    pub step: LifecycleStep,
    pub status: i32,
    pub micros: u128,
}

/// Owns a graph and the bound execution of each of its nodes.
///
/// Nodes are driven in graph order. The first failing node aborts the
/// current pass and its error is returned; nothing is retried.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    nodes: Vec<ExecNode>,
    trace_enabled: bool,
    events: Vec<TraceEvent>,
}

impl Session {
    /// Bind every node against `registry` and initialise it.
    pub fn new(graph: Graph, registry: &OpRegistry) -> Result<Self, ExecError> {
        let mut nodes = Vec::with_capacity(graph.nodes().len());
        for node in graph.nodes() {
            nodes.push(ExecNode::bind(registry, &graph, node.index)?);
        }
        let mut session = Self {
            graph,
            nodes,
            trace_enabled: false,
            events: Vec::new(),
        };
        if let Err(err) = session.drive(LifecycleStep::Init) {
            // Already-bound nodes are torn down; the init error is the one reported.
            let _ = session.release();
            return Err(err);
        }
        Ok(session)
    }

    /// Bind against the process-wide registry.
    pub fn from_builtin(graph: Graph) -> Result<Self, ExecError> {
        let registry = read_builtin();
        Self::new(graph, &registry)
    }

    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable graph access, e.g. to feed new input data between runs.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn exec_nodes(&self) -> &[ExecNode] {
        &self.nodes
    }

    pub fn backend_of(&self, node: NodeId) -> Option<&'static str> {
        self.nodes
            .iter()
            .find(|exec_node| exec_node.node_index() == node)
            .map(ExecNode::backend_name)
    }

    pub fn trace_events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn prerun(&mut self) -> Result<(), ExecError> {
        self.drive(LifecycleStep::Prerun)
    }

    pub fn reshape(&mut self) -> Result<(), ExecError> {
        self.drive(LifecycleStep::Reshape)
    }

    /// One inference pass.
    pub fn run(&mut self) -> Result<(), ExecError> {
        self.drive(LifecycleStep::Run)
    }

    pub fn postrun(&mut self) -> Result<(), ExecError> {
        self.drive(LifecycleStep::Postrun)
    }

    /// Release every node that is not released yet, reporting the first
    /// failure after all nodes have been visited.
    pub fn release(&mut self) -> Result<(), ExecError> {
        let mut first_err = None;
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].state() == NodeState::Released {
                continue;
            }
            if let Err(err) = self.step_node(idx, LifecycleStep::Release) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Release the nodes and hand the graph back.
    pub fn into_graph(mut self) -> Graph {
        if let Err(err) = self.release() {
            crate::warning!("session teardown: {}", err);
        }
        std::mem::take(&mut self.graph)
    }

    fn drive(&mut self, step: LifecycleStep) -> Result<(), ExecError> {
        for idx in 0..self.nodes.len() {
            self.step_node(idx, step)?;
        }
        Ok(())
    }

    fn step_node(&mut self, idx: usize, step: LifecycleStep) -> Result<(), ExecError> {
        let start = Instant::now();
        let exec_node = &mut self.nodes[idx];
        let result = match step {
            LifecycleStep::Init => exec_node.init(&self.graph),
            LifecycleStep::Prerun => exec_node.prerun(&mut self.graph),
            LifecycleStep::Reshape => exec_node.reshape(&mut self.graph),
            LifecycleStep::Run => exec_node.run(&mut self.graph),
            LifecycleStep::Postrun => exec_node.postrun(&mut self.graph),
            LifecycleStep::Release => exec_node.release(&self.graph),
        };
        let micros = start.elapsed().as_micros();
        let node_index = exec_node.node_index();
        let backend = exec_node.backend_name();

        if let Err(err) = &result {
            crate::error!("node {} ({}) {} failed: {}", node_index, backend, step, err);
        }
        if self.trace_enabled {
            let node_desc = match self.graph.node(node_index) {
                Ok(node) => describe_node(&self.graph, node),
                Err(_) => format!("#{}", node_index),
            };
            crate::trace!("{} [{}] {} {}us", node_desc, backend, step, micros);
            self.events.push(TraceEvent {
                node_index,
                node_desc,
                backend,
                step,
                status: status_of(&result),
                micros,
            });
        }
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            crate::warning!("session teardown: {}", err);
        }
    }
}
