use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;

use crate::error::RegistryError;
use crate::graph::OpKind;

use super::NodeOps;

/// Operator type -> backends, in registration order.
#[derive(Debug, Default)]
pub struct OpRegistry {
    entries: HashMap<OpKind, Vec<Arc<dyn NodeOps>>>,
}

fn same_ops(a: &Arc<dyn NodeOps>, b: &Arc<dyn NodeOps>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `ops` to the candidates of `op`.
    ///
    /// The same implementation (by identity) may appear at most once per op.
    pub fn register(&mut self, op: OpKind, ops: Arc<dyn NodeOps>) -> Result<(), RegistryError> {
        let candidates = self.entries.entry(op).or_default();
        if candidates.iter().any(|existing| same_ops(existing, &ops)) {
            return Err(RegistryError::AlreadyRegistered {
                op,
                name: ops.name(),
            });
        }
        crate::trace!("register {} backend for op {}", ops.name(), op);
        candidates.push(ops);
        Ok(())
    }

    /// Remove a previously registered implementation.
    pub fn unregister(&mut self, op: OpKind, ops: &Arc<dyn NodeOps>) -> Result<(), RegistryError> {
        let not_found = || RegistryError::NotFound {
            op,
            name: ops.name(),
        };
        let candidates = self.entries.get_mut(&op).ok_or_else(not_found)?;
        let pos = candidates
            .iter()
            .position(|existing| same_ops(existing, ops))
            .ok_or_else(not_found)?;
        candidates.remove(pos);
        if candidates.is_empty() {
            self.entries.remove(&op);
        }
        crate::trace!("unregister {} backend for op {}", ops.name(), op);
        Ok(())
    }

    /// Snapshot of the candidates for `op`; empty when none are registered.
    pub fn lookup(&self, op: OpKind) -> Vec<Arc<dyn NodeOps>> {
        self.candidates(op).to_vec()
    }

    pub fn candidates(&self, op: OpKind) -> &[Arc<dyn NodeOps>] {
        self.entries.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Operator types with at least one backend, sorted by name.
    pub fn registered_ops(&self) -> Vec<OpKind> {
        let mut ops: Vec<OpKind> = self.entries.keys().copied().collect();
        ops.sort_by_key(|op| op.as_str());
        ops
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

static BUILTIN_REGISTRY: Lazy<RwLock<OpRegistry>> = Lazy::new(|| RwLock::new(OpRegistry::new()));

/// Process-wide registry populated by [`crate::ops::builtin::init_builtin_ops`].
pub fn builtin_registry() -> &'static RwLock<OpRegistry> {
    &BUILTIN_REGISTRY
}

// Registry mutations are all-or-nothing, so a poisoned lock still guards a
// consistent table.
pub(crate) fn read_builtin() -> RwLockReadGuard<'static, OpRegistry> {
    BUILTIN_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_builtin() -> RwLockWriteGuard<'static, OpRegistry> {
    BUILTIN_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

pub fn register_builtin_node_ops(op: OpKind, ops: Arc<dyn NodeOps>) -> Result<(), RegistryError> {
    write_builtin().register(op, ops)
}

pub fn unregister_builtin_node_ops(
    op: OpKind,
    ops: &Arc<dyn NodeOps>,
) -> Result<(), RegistryError> {
    write_builtin().unregister(op, ops)
}
