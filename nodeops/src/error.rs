use thiserror::Error;

use crate::executor::{LifecycleStep, NodeState};
use crate::graph::OpKind;

/// Status code returned by lifecycle entry points on success.
pub const STATUS_OK: i32 = 0;

const EPERM: i32 = 1;
const ENOENT: i32 = 2;
const ENOMEM: i32 = 12;
const EEXIST: i32 = 17;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;

/// Failures raised by numeric kernels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to allocate scratch buffer of {len} elements")]
    AllocationFailure { len: usize },
}

/// Misuse of the operator registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("backend {name} already registered for op {op}")]
    AlreadyRegistered { op: OpKind, name: &'static str },
    #[error("backend {name} not registered for op {op}")]
    NotFound { op: OpKind, name: &'static str },
}

/// Backend selection failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no backend available for op {op} (node {node})")]
    NoBackendAvailable { op: OpKind, node: usize },
}

/// Error surfaced by a bound execution.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("node {node}: {step} not allowed in state {state}")]
    InvalidState {
        node: usize,
        step: LifecycleStep,
        state: NodeState,
    },
    #[error("node {node}: {reason}")]
    InvalidTensor { node: usize, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KernelError {
    pub fn status_code(&self) -> i32 {
        match self {
            KernelError::InvalidArgument(_) => -EINVAL,
            KernelError::AllocationFailure { .. } => -ENOMEM,
        }
    }
}

impl RegistryError {
    pub fn status_code(&self) -> i32 {
        match self {
            RegistryError::AlreadyRegistered { .. } => -EEXIST,
            RegistryError::NotFound { .. } => -ENOENT,
        }
    }
}

impl DispatchError {
    pub fn status_code(&self) -> i32 {
        -ENODEV
    }
}

impl ExecError {
    /// Negative errno-style code for callers that only speak status integers.
    pub fn status_code(&self) -> i32 {
        match self {
            ExecError::Kernel(err) => err.status_code(),
            ExecError::Registry(err) => err.status_code(),
            ExecError::Dispatch(err) => err.status_code(),
            ExecError::InvalidTensor { .. } => -EINVAL,
            ExecError::InvalidState { .. } | ExecError::Other(_) => -EPERM,
        }
    }
}

/// Collapse a lifecycle result into its status code.
pub fn status_of(result: &Result<(), ExecError>) -> i32 {
    match result {
        Ok(()) => STATUS_OK,
        Err(err) => err.status_code(),
    }
}
