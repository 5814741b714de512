mod shape;
mod tensor;
mod value;

pub use shape::{normalize_axis, numel, split_at_axis};
pub use tensor::Tensor;
pub use value::{DType, TensorElement, TensorValue};
