use std::sync::Arc;

use crate::error::DispatchError;
use crate::graph::{Graph, Node};

use super::{NodeOps, OpsScore, OpRegistry};

/// Pick the backend that will run `node`.
///
/// Candidates are scored in registration order. The first one reporting
/// [`OpsScore::BEST`] wins outright; otherwise the strictly highest score
/// wins and ties keep the earlier registration. Candidates scoring
/// [`OpsScore::NOTSUP`] or below are never selected.
pub fn select(
    registry: &OpRegistry,
    graph: &Graph,
    node: &Node,
) -> Result<Arc<dyn NodeOps>, DispatchError> {
    let mut best: Option<(OpsScore, &Arc<dyn NodeOps>)> = None;
    for candidate in registry.candidates(node.op) {
        let score = candidate.score(graph, node);
        crate::trace!(
            "node {} ({}): backend {} scored {}",
            node.index,
            node.op,
            candidate.name(),
            score
        );
        if !score.is_supported() {
            continue;
        }
        if score.is_best() {
            best = Some((score, candidate));
            break;
        }
        match best {
            Some((current, _)) if current >= score => {}
            _ => best = Some((score, candidate)),
        }
    }

    match best {
        Some((score, ops)) => {
            crate::trace!(
                "node {} ({}): bound to {} (score {})",
                node.index,
                node.op,
                ops.name(),
                score
            );
            Ok(Arc::clone(ops))
        }
        None => {
            crate::error!("node {} ({}): no backend available", node.index, node.op);
            Err(DispatchError::NoBackendAvailable {
                op: node.op,
                node: node.index,
            })
        }
    }
}
