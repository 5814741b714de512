//! Backend implementations and their selection.
//!
//! Every backend implements [`NodeOps`]. Backends are registered per
//! [`OpKind`](crate::graph::OpKind) in an [`OpRegistry`], and
//! [`dispatch::select`] binds the best scoring one to a node.
use std::fmt;

use crate::error::ExecError;
use crate::executor::ExecNode;
use crate::graph::{Graph, Node, TensorId};

pub mod builtin;
pub mod dispatch;
pub mod registry;

mod cmsis;
mod cpu;

pub use cmsis::softmax::{softmax, softmax_q7, CmsisSoftmaxOps, Q7_OUTPUT_DEC_BITS};
pub use cpu::softmax::{softmax_f32_axis, CpuSoftmaxOps};
pub use registry::{
    builtin_registry, register_builtin_node_ops, unregister_builtin_node_ops, OpRegistry,
};

/// Preference a backend reports for running a given node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpsScore(i32);

impl OpsScore {
    /// Select this backend regardless of any other candidate.
    pub const BEST: OpsScore = OpsScore(i32::MAX);
    pub const PREFER: OpsScore = OpsScore(6000);
    pub const CANDO: OpsScore = OpsScore(4000);
    /// The backend cannot run the node.
    pub const NOTSUP: OpsScore = OpsScore(0);

    pub const fn new(value: i32) -> Self {
        OpsScore(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn is_best(self) -> bool {
        self == OpsScore::BEST
    }

    pub fn is_supported(self) -> bool {
        self > OpsScore::NOTSUP
    }
}

impl fmt::Display for OpsScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_best() {
            write!(f, "best")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One backend implementation of an operator type.
///
/// Only [`NodeOps::name`] and [`NodeOps::score`] are mandatory; every
/// lifecycle step defaults to a no-op. The executor guarantees the calls for a
/// single node are serialised (`ExecNode` hands out `&mut` access), so
/// implementations keep per-node state in the node's private slot rather than
/// in `self`.
pub trait NodeOps: Send + Sync {
    /// Stable backend identifier, used in traces and settings.
    fn name(&self) -> &'static str;

    fn init_node(&self, _exec_node: &mut ExecNode, _graph: &Graph) -> Result<(), ExecError> {
        Ok(())
    }

    fn prerun(&self, _exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        Ok(())
    }

    fn reshape(&self, _exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        Ok(())
    }

    fn run(&self, _exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        Ok(())
    }

    fn postrun(&self, _exec_node: &mut ExecNode, _graph: &mut Graph) -> Result<(), ExecError> {
        Ok(())
    }

    fn release_node(&self, _exec_node: &mut ExecNode, _graph: &Graph) -> Result<(), ExecError> {
        Ok(())
    }

    /// How well this backend fits `node`; `NOTSUP` excludes it.
    fn score(&self, graph: &Graph, node: &Node) -> OpsScore;
}

impl fmt::Debug for dyn NodeOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeOps({})", self.name())
    }
}

/// Input and output tensor of a single-input, single-output node.
pub(crate) fn unary_io(node: &Node) -> Result<(TensorId, TensorId), ExecError> {
    match (node.inputs.as_slice(), node.outputs.as_slice()) {
        ([input], [output]) => Ok((*input, *output)),
        _ => Err(ExecError::InvalidTensor {
            node: node.index,
            reason: format!(
                "{} expects 1 input and 1 output, got {} and {}",
                node.op,
                node.inputs.len(),
                node.outputs.len()
            ),
        }),
    }
}
