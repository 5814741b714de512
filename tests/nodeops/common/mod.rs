use std::sync::{Arc, Mutex};

use anyhow::Result;
use nodeops::{
    AttrValue, ExecError, ExecNode, Graph, KernelError, LifecycleStep, Node, NodeId, NodeOps,
    OpAttrs, OpKind, OpsScore, Tensor, TensorId,
};

/// Backend with a fixed score that records every lifecycle call it sees.
pub struct MockOps {
    name: &'static str,
    score: OpsScore,
    fail_on: Option<LifecycleStep>,
    calls: Mutex<Vec<(NodeId, LifecycleStep)>>,
}

impl MockOps {
    pub fn new(name: &'static str, score: OpsScore) -> Arc<Self> {
        Arc::new(Self {
            name,
            score,
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_run(name: &'static str, score: OpsScore) -> Arc<Self> {
        Self::failing_on(name, score, LifecycleStep::Run)
    }

    pub fn failing_release(name: &'static str, score: OpsScore) -> Arc<Self> {
        Self::failing_on(name, score, LifecycleStep::Release)
    }

    fn failing_on(name: &'static str, score: OpsScore, step: LifecycleStep) -> Arc<Self> {
        Arc::new(Self {
            name,
            score,
            fail_on: Some(step),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(NodeId, LifecycleStep)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn steps(&self) -> Vec<LifecycleStep> {
        self.calls().into_iter().map(|(_, step)| step).collect()
    }

    fn record(&self, exec_node: &ExecNode, step: LifecycleStep) -> Result<(), ExecError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((exec_node.node_index(), step));
        if self.fail_on == Some(step) {
            let reason = format!("{} refuses to {}", self.name, step);
            return Err(KernelError::InvalidArgument(reason).into());
        }
        Ok(())
    }
}

impl NodeOps for MockOps {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init_node(&self, exec_node: &mut ExecNode, _graph: &Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Init)
    }

    fn prerun(&self, exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Prerun)
    }

    fn reshape(&self, exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Reshape)
    }

    fn run(&self, exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Run)
    }

    fn postrun(&self, exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Postrun)
    }

    fn release_node(&self, exec_node: &mut ExecNode, _graph: &Graph) -> Result<(), ExecError> {
        self.record(exec_node, LifecycleStep::Release)
    }

    fn score(&self, _graph: &Graph, _node: &Node) -> OpsScore {
        self.score
    }
}

/// Same allocation, viewed as a registry entry.
pub fn as_ops(ops: &Arc<MockOps>) -> Arc<dyn NodeOps> {
    ops.clone()
}

/// Graph with a single `I8` softmax node `x -> y`.
pub fn softmax_graph_i8(data: Vec<i8>, dec_bits: i32) -> Result<(Graph, TensorId, TensorId)> {
    let len = data.len();
    let mut graph = Graph::new();
    let x = graph.add_tensor(Tensor::from_vec("x", data)?.with_dec_bits(dec_bits))?;
    let y = graph.add_tensor(Tensor::from_vec("y", vec![0i8; len])?)?;
    graph.add_node("softmax", OpKind::Softmax, OpAttrs::none(), vec![x], vec![y])?;
    Ok((graph, x, y))
}

/// Graph with a single `F32` softmax node `x -> y` over `shape`.
pub fn softmax_graph_f32(
    data: Vec<f32>,
    shape: Vec<usize>,
    axis: Option<i64>,
) -> Result<(Graph, TensorId, TensorId)> {
    let mut graph = Graph::new();
    let x = graph.add_tensor(Tensor::new("x", nodeops::TensorValue::F32(data), shape.clone())?)?;
    let y = graph.add_tensor(Tensor::zeros("y", nodeops::DType::F32, shape))?;
    let attrs = match axis {
        Some(axis) => OpAttrs::none().with("axis", AttrValue::Int(axis)),
        None => OpAttrs::none(),
    };
    graph.add_node("softmax", OpKind::Softmax, attrs, vec![x], vec![y])?;
    Ok((graph, x, y))
}

pub fn i8_data(graph: &Graph, id: TensorId) -> Result<Vec<i8>> {
    graph
        .get_tensor(id)?
        .data::<i8>()
        .map(<[i8]>::to_vec)
        .ok_or_else(|| anyhow::anyhow!("tensor {} is not i8", id))
}

pub fn f32_data(graph: &Graph, id: TensorId) -> Result<Vec<f32>> {
    graph
        .get_tensor(id)?
        .data::<f32>()
        .map(<[f32]>::to_vec)
        .ok_or_else(|| anyhow::anyhow!("tensor {} is not f32", id))
}

pub fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (idx, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol,
            "index {}: got {}, expected {} (tol {})",
            idx,
            a,
            e,
            tol
        );
    }
}

pub fn assert_monotone(input: &[i8], output: &[i8]) {
    for (i, (&xi, &yi)) in input.iter().zip(output).enumerate() {
        for (j, (&xj, &yj)) in input.iter().zip(output).enumerate() {
            if xi <= xj {
                assert!(
                    yi <= yj,
                    "not monotone: x[{}]={} -> {}, x[{}]={} -> {}",
                    i,
                    xi,
                    yi,
                    j,
                    xj,
                    yj
                );
            }
        }
    }
}
