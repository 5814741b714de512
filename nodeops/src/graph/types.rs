//! Core graph data types.
//!
//! A graph owns its tensors and a list of operator nodes in execution order.
//! Nodes reference tensors by id; both are immutable once added, apart from
//! tensor contents written by kernels.
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

pub type TensorId = usize;
pub type NodeId = usize;

/// Attribute value attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
}

/// Named attribute for an op invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpAttr {
    pub name: String,
    pub value: AttrValue,
}

/// Collection of op attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpAttrs {
    pub items: Vec<OpAttr>,
}

impl OpAttrs {
    /// Build an empty attribute set.
    pub fn none() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an attribute, builder style.
    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.items.push(OpAttr {
            name: name.into(),
            value,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.items
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(AttrValue::Int(value)) => Ok(Some(*value)),
            Some(other) => Err(anyhow!("attribute {} expects int, got {:?}", name, other)),
        }
    }
}

/// Operator type tag used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Softmax,
    /// No built-in backend; embedders register their own under this key.
    Relu,
}

impl OpKind {
    /// String identifier for the op kind.
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Softmax => "softmax",
            OpKind::Relu => "relu",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OpKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "softmax" => Ok(OpKind::Softmax),
            "relu" => Ok(OpKind::Relu),
            _ => Err(anyhow!("unsupported op {}", value)),
        }
    }
}

/// An operator instance in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub index: NodeId,
    pub name: String,
    pub op: OpKind,
    pub attrs: OpAttrs,
    pub inputs: Vec<TensorId>,
    pub outputs: Vec<TensorId>,
}

/// Graph owning tensors and nodes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    tensors: Vec<Tensor>,
    nodes: Vec<Node>,
    names: HashMap<String, TensorId>,
}

impl Graph {
    /// Create an empty graph.
    ///
    /// # Example
    /// ```
    /// # use nodeops::graph::{Graph, OpAttrs, OpKind};
    /// # use nodeops::tensor::Tensor;
    /// # fn main() -> anyhow::Result<()> {
    /// let mut g = Graph::new();
    /// let x = g.add_tensor(Tensor::from_vec("x", vec![0i8; 4])?.with_dec_bits(1))?;
    /// let y = g.add_tensor(Tensor::from_vec("y", vec![0i8; 4])?)?;
    /// g.add_node("softmax", OpKind::Softmax, OpAttrs::none(), vec![x], vec![y])?;
    /// # Ok(()) }
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tensor; names must be unique within the graph.
    pub fn add_tensor(&mut self, tensor: Tensor) -> Result<TensorId> {
        if self.names.contains_key(tensor.name()) {
            return Err(anyhow!("duplicate tensor name: {}", tensor.name()));
        }
        let id = self.tensors.len();
        self.names.insert(tensor.name().to_string(), id);
        self.tensors.push(tensor);
        Ok(id)
    }

    /// Append a node referencing existing tensors.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        op: OpKind,
        attrs: OpAttrs,
        inputs: Vec<TensorId>,
        outputs: Vec<TensorId>,
    ) -> Result<NodeId> {
        let name = name.into();
        for id in inputs.iter().chain(outputs.iter()) {
            if *id >= self.tensors.len() {
                return Err(anyhow!("node {}: missing tensor id {}", name, id));
            }
        }
        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            name,
            op,
            attrs,
            inputs,
            outputs,
        });
        Ok(index)
    }

    pub fn tensor_id(&self, name: &str) -> Result<TensorId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("missing tensor: {}", name))
    }

    pub fn get_tensor(&self, id: TensorId) -> Result<&Tensor> {
        self.tensors
            .get(id)
            .ok_or_else(|| anyhow!("invalid tensor id {}", id))
    }

    pub fn get_tensor_mut(&mut self, id: TensorId) -> Result<&mut Tensor> {
        self.tensors
            .get_mut(id)
            .ok_or_else(|| anyhow!("invalid tensor id {}", id))
    }

    /// Borrow an input tensor and a distinct output tensor at the same time.
    pub fn tensor_pair_mut(
        &mut self,
        input: TensorId,
        output: TensorId,
    ) -> Result<(&Tensor, &mut Tensor)> {
        if input == output {
            return Err(anyhow!("tensor {} used as both input and output", input));
        }
        let len = self.tensors.len();
        if input >= len || output >= len {
            return Err(anyhow!("invalid tensor pair ({}, {})", input, output));
        }
        if input < output {
            let (head, tail) = self.tensors.split_at_mut(output);
            Ok((&head[input], &mut tail[0]))
        } else {
            let (head, tail) = self.tensors.split_at_mut(input);
            Ok((&tail[0], &mut head[output]))
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| anyhow!("invalid node id {}", id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
