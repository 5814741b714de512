//! Tensor descriptor.
//!
//! A `Tensor` pairs its flat buffer with the shape and the fixed-point
//! exponent describing its quantization, so element count and buffer length
//! can never disagree.
use anyhow::{anyhow, Result};

use super::shape::numel;
use super::value::{DType, TensorElement, TensorValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    name: String,
    value: TensorValue,
    shape: Vec<usize>,
    dec_bits: i32,
}

impl Tensor {
    /// Build a tensor from a buffer and an explicit shape.
    ///
    /// # Example
    /// ```
    /// # use nodeops::tensor::{Tensor, TensorValue};
    /// # fn main() -> anyhow::Result<()> {
    /// let t = Tensor::new("x", TensorValue::I8(vec![1, 2, 3, 4]), vec![2, 2])?;
    /// assert_eq!(t.elem_num(), 4);
    /// # Ok(()) }
    /// ```
    pub fn new(name: impl Into<String>, value: TensorValue, shape: Vec<usize>) -> Result<Self> {
        let name = name.into();
        let expected = numel(&shape);
        if value.len() != expected {
            return Err(anyhow!(
                "tensor {}: buffer holds {} elements, shape {:?} needs {}",
                name,
                value.len(),
                shape,
                expected
            ));
        }
        Ok(Self {
            name,
            value,
            shape,
            dec_bits: 0,
        })
    }

    /// Build a rank-1 tensor from a flat vector.
    pub fn from_vec<T: TensorElement>(name: impl Into<String>, data: Vec<T>) -> Result<Self> {
        let shape = vec![data.len()];
        Self::new(name, T::into_value(data), shape)
    }

    pub fn zeros(name: impl Into<String>, dtype: DType, shape: Vec<usize>) -> Self {
        let value = TensorValue::zeros(dtype, numel(&shape));
        Self {
            name: name.into(),
            value,
            shape,
            dec_bits: 0,
        }
    }

    /// Attach the fixed-point exponent: a stored integer `q` represents
    /// `q / 2^dec_bits`.
    pub fn with_dec_bits(mut self, dec_bits: i32) -> Self {
        self.dec_bits = dec_bits;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.value.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn elem_num(&self) -> usize {
        self.value.len()
    }

    pub fn dec_bits(&self) -> i32 {
        self.dec_bits
    }

    pub fn set_dec_bits(&mut self, dec_bits: i32) {
        self.dec_bits = dec_bits;
    }

    pub fn data<T: TensorElement>(&self) -> Option<&[T]> {
        T::slice(&self.value)
    }

    pub fn data_mut<T: TensorElement>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(&mut self.value)
    }

    /// Change the shape, growing or shrinking the buffer with zeros.
    pub fn reshape(&mut self, shape: Vec<usize>) {
        self.value.resize_zeroed(numel(&shape));
        self.shape = shape;
    }
}
