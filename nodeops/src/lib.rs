pub mod logging;

pub mod error;
pub mod executor;
pub mod graph;
pub mod ops;
pub mod settings;
pub mod tensor;

pub use error::{status_of, DispatchError, ExecError, KernelError, RegistryError, STATUS_OK};
pub use executor::{ExecNode, LifecycleStep, NodeState, Session, TraceEvent};
pub use graph::{AttrValue, Graph, Node, NodeId, OpAttrs, OpKind, TensorId};
pub use ops::builtin::{init_builtin_ops, release_builtin_ops, BuiltinOps};
pub use ops::{
    register_builtin_node_ops, softmax, unregister_builtin_node_ops, NodeOps, OpRegistry, OpsScore,
};
pub use settings::{Settings, SoftmaxVariant};
pub use tensor::{DType, Tensor, TensorElement, TensorValue};
