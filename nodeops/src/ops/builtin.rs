//! Explicit startup and shutdown of the built-in backends.
//!
//! Nothing registers itself at load time. The embedder calls
//! [`init_builtin_ops`] once at startup and hands the returned
//! [`BuiltinOps`] back to [`release_builtin_ops`] at shutdown.
use std::sync::Arc;

use crate::error::RegistryError;
use crate::graph::OpKind;
use crate::settings::Settings;

use super::registry::write_builtin;
use super::{CmsisSoftmaxOps, CpuSoftmaxOps, NodeOps, OpRegistry};

/// Backends registered by one startup call, in registration order.
#[derive(Debug)]
pub struct BuiltinOps {
    entries: Vec<(OpKind, Arc<dyn NodeOps>)>,
}

impl BuiltinOps {
    pub fn entries(&self) -> &[(OpKind, Arc<dyn NodeOps>)] {
        &self.entries
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, ops)| ops.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Built-in backends in registration order, minus the disabled ones.
pub fn builtin_ops_list(settings: &Settings) -> Vec<(OpKind, Arc<dyn NodeOps>)> {
    let cpu_softmax: Arc<dyn NodeOps> = Arc::new(CpuSoftmaxOps::new());
    let cmsis_softmax: Arc<dyn NodeOps> =
        Arc::new(CmsisSoftmaxOps::new(settings.softmax_variant));
    let all = vec![
        (OpKind::Softmax, cpu_softmax),
        (OpKind::Softmax, cmsis_softmax),
    ];
    all.into_iter()
        .filter(|(op, ops)| {
            let disabled = settings.is_disabled(ops.name());
            if disabled {
                crate::trace!("skip disabled backend {} for op {}", ops.name(), op);
            }
            !disabled
        })
        .collect()
}

/// Register the built-in list into `registry`.
///
/// All or nothing: on failure the entries added so far are removed again.
pub fn register_ops_list(
    registry: &mut OpRegistry,
    settings: &Settings,
) -> Result<BuiltinOps, RegistryError> {
    let entries = builtin_ops_list(settings);
    for (idx, (op, ops)) in entries.iter().enumerate() {
        if let Err(err) = registry.register(*op, Arc::clone(ops)) {
            for (op, ops) in entries[..idx].iter().rev() {
                let _ = registry.unregister(*op, ops);
            }
            return Err(err);
        }
    }
    Ok(BuiltinOps { entries })
}

/// Unregister a startup list in reverse order. Every entry is attempted;
/// the first failure is returned.
pub fn unregister_ops_list(
    registry: &mut OpRegistry,
    handle: BuiltinOps,
) -> Result<(), RegistryError> {
    let mut first_err = None;
    for (op, ops) in handle.entries.iter().rev() {
        if let Err(err) = registry.unregister(*op, ops) {
            first_err.get_or_insert(err);
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Populate the process-wide registry.
pub fn init_builtin_ops(settings: &Settings) -> Result<BuiltinOps, RegistryError> {
    let handle = register_ops_list(&mut write_builtin(), settings)?;
    crate::trace!("builtin ops ready: {:?}", handle.backend_names());
    Ok(handle)
}

pub fn release_builtin_ops(handle: BuiltinOps) -> Result<(), RegistryError> {
    unregister_ops_list(&mut write_builtin(), handle).map_err(|err| {
        crate::critical!("builtin ops teardown left entries behind: {}", err);
        err
    })
}
