//! Fixed-point backends for `I8` tensors in the power-of-two quantized domain.
pub mod softmax;
