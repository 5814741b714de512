mod node;
mod types;

pub use node::describe_node;
pub use types::{AttrValue, Graph, Node, NodeId, OpAttr, OpAttrs, OpKind, TensorId};
