use anyhow::Result;
use nodeops::{OpKind, OpRegistry, OpsScore, RegistryError};

use crate::common::{self, MockOps};

fn names(registry: &OpRegistry, op: OpKind) -> Vec<&'static str> {
    registry.lookup(op).iter().map(|ops| ops.name()).collect()
}

#[test]
fn registry_lookup_keeps_registration_order() -> Result<()> {
    let mut registry = OpRegistry::new();
    let a = MockOps::new("a", OpsScore::CANDO);
    let b = MockOps::new("b", OpsScore::PREFER);
    let c = MockOps::new("c", OpsScore::BEST);
    registry.register(OpKind::Softmax, common::as_ops(&b))?;
    registry.register(OpKind::Softmax, common::as_ops(&a))?;
    registry.register(OpKind::Softmax, common::as_ops(&c))?;
    assert_eq!(names(&registry, OpKind::Softmax), vec!["b", "a", "c"]);
    assert!(registry.lookup(OpKind::Relu).is_empty());
    Ok(())
}

#[test]
fn registry_rejects_duplicate_implementation() -> Result<()> {
    let mut registry = OpRegistry::new();
    let a = MockOps::new("a", OpsScore::CANDO);
    registry.register(OpKind::Softmax, common::as_ops(&a))?;
    let err = registry
        .register(OpKind::Softmax, common::as_ops(&a))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::AlreadyRegistered {
            op: OpKind::Softmax,
            name: "a"
        }
    );
    assert_eq!(err.status_code(), -17);
    assert_eq!(names(&registry, OpKind::Softmax), vec!["a"]);
    Ok(())
}

#[test]
fn registry_same_name_different_instance_is_distinct() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register(OpKind::Softmax, common::as_ops(&MockOps::new("a", OpsScore::CANDO)))?;
    registry.register(OpKind::Softmax, common::as_ops(&MockOps::new("a", OpsScore::CANDO)))?;
    assert_eq!(registry.lookup(OpKind::Softmax).len(), 2);
    Ok(())
}

#[test]
fn registry_same_implementation_under_two_ops() -> Result<()> {
    let mut registry = OpRegistry::new();
    let a = MockOps::new("a", OpsScore::CANDO);
    registry.register(OpKind::Softmax, common::as_ops(&a))?;
    registry.register(OpKind::Relu, common::as_ops(&a))?;
    assert_eq!(registry.registered_ops(), vec![OpKind::Relu, OpKind::Softmax]);
    Ok(())
}

#[test]
fn registry_unregister_restores_previous_state() -> Result<()> {
    let mut registry = OpRegistry::new();
    let a = MockOps::new("a", OpsScore::CANDO);
    let b = MockOps::new("b", OpsScore::CANDO);
    registry.register(OpKind::Softmax, common::as_ops(&a))?;
    let before = names(&registry, OpKind::Softmax);

    registry.register(OpKind::Softmax, common::as_ops(&b))?;
    registry.unregister(OpKind::Softmax, &common::as_ops(&b))?;
    assert_eq!(names(&registry, OpKind::Softmax), before);

    registry.unregister(OpKind::Softmax, &common::as_ops(&a))?;
    assert!(registry.is_empty());
    assert!(registry.registered_ops().is_empty());
    Ok(())
}

#[test]
fn registry_unregister_unknown_fails() -> Result<()> {
    let mut registry = OpRegistry::new();
    let a = MockOps::new("a", OpsScore::CANDO);
    let err = registry
        .unregister(OpKind::Softmax, &common::as_ops(&a))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::NotFound {
            op: OpKind::Softmax,
            name: "a"
        }
    );
    assert_eq!(err.status_code(), -2);

    registry.register(OpKind::Softmax, common::as_ops(&a))?;
    let b = MockOps::new("b", OpsScore::CANDO);
    assert!(registry.unregister(OpKind::Softmax, &common::as_ops(&b)).is_err());
    assert!(registry.unregister(OpKind::Relu, &common::as_ops(&a)).is_err());
    assert_eq!(names(&registry, OpKind::Softmax), vec!["a"]);
    Ok(())
}

#[test]
fn registry_clear_drops_everything() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register(OpKind::Softmax, common::as_ops(&MockOps::new("a", OpsScore::CANDO)))?;
    registry.register(OpKind::Relu, common::as_ops(&MockOps::new("b", OpsScore::CANDO)))?;
    assert!(!registry.is_empty());
    registry.clear();
    assert!(registry.is_empty());
    Ok(())
}
