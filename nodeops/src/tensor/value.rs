use std::fmt;

use serde::{Deserialize, Serialize};

/// Element type of a tensor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    I8,
    F32,
}

impl DType {
    pub fn as_str(self) -> &'static str {
        match self {
            DType::I8 => "i8",
            DType::F32 => "f32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed flat buffer backing a tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    I8(Vec<i8>),
    F32(Vec<f32>),
}

impl TensorValue {
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::I8 => TensorValue::I8(vec![0; len]),
            DType::F32 => TensorValue::F32(vec![0.0; len]),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::I8(_) => DType::I8,
            TensorValue::F32(_) => DType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorValue::I8(data) => data.len(),
            TensorValue::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn resize_zeroed(&mut self, len: usize) {
        match self {
            TensorValue::I8(data) => data.resize(len, 0),
            TensorValue::F32(data) => data.resize(len, 0.0),
        }
    }
}

/// Element type that can be viewed out of a `TensorValue`.
pub trait TensorElement: Sized + Copy {
    fn slice(value: &TensorValue) -> Option<&[Self]>;
    fn slice_mut(value: &mut TensorValue) -> Option<&mut [Self]>;
    fn into_value(data: Vec<Self>) -> TensorValue;
}

impl TensorElement for i8 {
    fn slice(value: &TensorValue) -> Option<&[Self]> {
        match value {
            TensorValue::I8(data) => Some(data),
            _ => None,
        }
    }

    fn slice_mut(value: &mut TensorValue) -> Option<&mut [Self]> {
        match value {
            TensorValue::I8(data) => Some(data),
            _ => None,
        }
    }

    fn into_value(data: Vec<Self>) -> TensorValue {
        TensorValue::I8(data)
    }
}

impl TensorElement for f32 {
    fn slice(value: &TensorValue) -> Option<&[Self]> {
        match value {
            TensorValue::F32(data) => Some(data),
            _ => None,
        }
    }

    fn slice_mut(value: &mut TensorValue) -> Option<&mut [Self]> {
        match value {
            TensorValue::F32(data) => Some(data),
            _ => None,
        }
    }

    fn into_value(data: Vec<Self>) -> TensorValue {
        TensorValue::F32(data)
    }
}
