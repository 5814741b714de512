use anyhow::anyhow;

use crate::error::ExecError;
use crate::executor::ExecNode;
use crate::graph::{Graph, Node, OpKind, TensorId};
use crate::ops::{unary_io, NodeOps, OpsScore};
use crate::settings::SoftmaxVariant;
use crate::tensor::DType;

mod kernels;

pub use kernels::{softmax, softmax_q7, Q7_OUTPUT_DEC_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoftmaxKernel {
    Float,
    Q7,
}

/// Per-node state fixed at prerun and refreshed by reshape.
#[derive(Debug, Clone, Copy)]
struct SoftmaxPlan {
    kernel: SoftmaxKernel,
    input: TensorId,
    output: TensorId,
}

/// Softmax over `I8` tensors in the power-of-two fixed-point domain.
///
/// Claims every `I8 -> I8` softmax node with matching element counts. The
/// output is always written in q0.7 (`dec_bits = 7`).
#[derive(Debug, Clone, Default)]
pub struct CmsisSoftmaxOps {
    variant: SoftmaxVariant,
}

impl CmsisSoftmaxOps {
    pub const NAME: &'static str = "cmsis";

    pub fn new(variant: SoftmaxVariant) -> Self {
        Self { variant }
    }

    fn pick_kernel(&self, node: &Node, input_dec_bits: i32) -> SoftmaxKernel {
        match self.variant {
            SoftmaxVariant::Float => SoftmaxKernel::Float,
            SoftmaxVariant::Q7 if input_dec_bits == 0 => SoftmaxKernel::Q7,
            SoftmaxVariant::Q7 => {
                crate::warning!(
                    "{}: q7 softmax needs dec_bits 0, got {}; using float kernel",
                    node.name,
                    input_dec_bits
                );
                SoftmaxKernel::Float
            }
        }
    }

    fn plan(&self, exec_node: &ExecNode, graph: &Graph) -> Result<SoftmaxPlan, ExecError> {
        let node = graph.node(exec_node.node_index())?;
        let (input, output) = unary_io(node)?;
        let kernel = self.pick_kernel(node, graph.get_tensor(input)?.dec_bits());
        crate::trace!("softmax node {}: {:?} kernel", node.index, kernel);
        Ok(SoftmaxPlan {
            kernel,
            input,
            output,
        })
    }
}

fn plan_of(exec_node: &ExecNode) -> Result<SoftmaxPlan, ExecError> {
    exec_node.priv_ref::<SoftmaxPlan>().copied().ok_or_else(|| {
        ExecError::Other(anyhow!(
            "softmax node {} has no plan",
            exec_node.node_index()
        ))
    })
}

impl NodeOps for CmsisSoftmaxOps {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init_node(&self, exec_node: &mut ExecNode, graph: &Graph) -> Result<(), ExecError> {
        unary_io(graph.node(exec_node.node_index())?)?;
        Ok(())
    }

    fn prerun(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let plan = self.plan(exec_node, graph)?;
        graph.get_tensor_mut(plan.output)?.set_dec_bits(Q7_OUTPUT_DEC_BITS);
        exec_node.set_priv(plan);
        Ok(())
    }

    /// The input may have changed shape or quantization; the kernel is
    /// picked again.
    fn reshape(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let plan = self.plan(exec_node, graph)?;
        let shape = graph.get_tensor(plan.input)?.shape().to_vec();
        graph.get_tensor_mut(plan.output)?.reshape(shape);
        exec_node.set_priv(plan);
        Ok(())
    }

    fn run(&self, exec_node: &mut ExecNode, graph: &mut Graph) -> Result<(), ExecError> {
        let plan = plan_of(exec_node)?;
        let node = exec_node.node_index();
        let (input, output) = graph.tensor_pair_mut(plan.input, plan.output)?;
        let dec_bits = input.dec_bits();
        let x = input.data::<i8>().ok_or_else(|| ExecError::InvalidTensor {
            node,
            reason: format!("softmax input must be i8, got {}", input.dtype()),
        })?;
        let out_dtype = output.dtype();
        let y = output
            .data_mut::<i8>()
            .ok_or_else(|| ExecError::InvalidTensor {
                node,
                reason: format!("softmax output must be i8, got {}", out_dtype),
            })?;
        match plan.kernel {
            SoftmaxKernel::Q7 if dec_bits == 0 => softmax_q7(x, y)?,
            _ => softmax(x, dec_bits, y)?,
        }
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
                if x.dtype() == DType::I8
                    && y.dtype() == DType::I8
                    && x.elem_num() == y.elem_num() =>
            {
                OpsScore::BEST
            }
            _ => OpsScore::NOTSUP,
        }
    }
}
