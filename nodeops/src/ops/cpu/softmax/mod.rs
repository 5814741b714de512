use anyhow::anyhow;

use crate::error::ExecError;
use crate::executor::ExecNode;
use crate::graph::{Graph, Node, OpKind, TensorId};
use crate::ops::{unary_io, NodeOps, OpsScore};
use crate::tensor::{normalize_axis, split_at_axis, DType};

mod kernels;

pub use kernels::softmax_f32_axis;

#[derive(Debug, Clone, Copy)]
struct AxisPlan {
    input: TensorId,
    output: TensorId,
    outer: usize,
    dim: usize,
    inner: usize,
}

/// Reference softmax for `F32` tensors along the `axis` attribute
/// (default: last axis).
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuSoftmaxOps;

impl CpuSoftmaxOps {
    pub const NAME: &'static str = "cpu_ref";

    pub fn new() -> Self {
        CpuSoftmaxOps
    }
}

fn plan(graph: &Graph, node: &Node) -> Result<AxisPlan, ExecError> {
    let (input, output) = unary_io(node)?;
    let axis = node.attrs.int("axis")?.unwrap_or(-1);
    let shape = graph.get_tensor(input)?.shape();
    let axis = normalize_axis(axis, shape.len())?;
    let (outer, dim, inner) = split_at_axis(shape, axis);
    Ok(AxisPlan {
        input,
        output,
        outer,
        dim,
        inner,
    })
}

impl NodeOps for CpuSoftmaxOps {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init_node(&self, exec_node: &mut ExecNode, graph: &Graph) -> Result<(), ExecError> {
        plan(graph, graph.node(exec_node.node_index())?)?;
        Ok(())
    }

    fn prerun(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let axis_plan = plan(graph, graph.node(exec_node.node_index())?)?;
        exec_node.set_priv(axis_plan);
        Ok(())
    }

    fn reshape(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let axis_plan = plan(graph, graph.node(exec_node.node_index())?)?;
        let shape = graph.get_tensor(axis_plan.input)?.shape().to_vec();
        graph.get_tensor_mut(axis_plan.output)?.reshape(shape);
        exec_node.set_priv(axis_plan);
        Ok(())
    }

    fn run(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let node = exec_node.node_index();
        let axis_plan = exec_node
            .priv_ref::<AxisPlan>()
            .copied()
            .ok_or_else(|| ExecError::Other(anyhow!("softmax node {} has no plan", node)))?;
        let (input, output) = graph.tensor_pair_mut(axis_plan.input, axis_plan.output)?;
        let x = input.data::<f32>().ok_or_else(|| ExecError::InvalidTensor {
            node,
            reason: format!("softmax input must be f32, got {}", input.dtype()),
        })?;
        let out_dtype = output.dtype();
        let y = output
            .data_mut::<f32>()
            .ok_or_else(|| ExecError::InvalidTensor {
                node,
                reason: format!("softmax output must be f32, got {}", out_dtype),
            })?;
        softmax_f32_axis(x, y, axis_plan.outer, axis_plan.dim, axis_plan.inner)?;
        Ok(())
    }

    fn score(&self, graph: &Graph, node: &Node) -> OpsScore {
        if node.op != OpKind::Softmax {
            return OpsScore::NOTSUP;
        }
        let Ok((input, output)) = unary_io(node) else {
            return OpsScore::NOTSUP;
        };
        match (graph.get_tensor(input), graph.get_tensor(output)) {
            (Ok(x), Ok(y))
                if x.dtype() == DType::F32
                    && y.dtype() == DType::F32
                    && x.elem_num() == y.elem_num() =>
            {
                OpsScore::CANDO
            }
            _ => OpsScore::NOTSUP,
        }
    }
}
