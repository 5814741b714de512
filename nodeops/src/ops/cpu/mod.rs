//! Generic float reference backends.
pub mod softmax;
