use anyhow::Result;
use nodeops::{
    ExecError, ExecNode, Graph, LifecycleStep, Node, NodeOps, NodeState, OpRegistry, OpKind,
    OpsScore, STATUS_OK,
};

use crate::common::{self, MockOps};

/// Backend relying on every default lifecycle method.
struct ScoreOnly;

impl NodeOps for ScoreOnly {
    fn name(&self) -> &'static str {
        "score_only"
    }

    fn score(&self, _graph: &Graph, _node: &Node) -> OpsScore {
        OpsScore::CANDO
    }
}

fn bound_mock(mock: &std::sync::Arc<MockOps>) -> Result<(Graph, ExecNode)> {
    let (graph, _, _) = common::softmax_graph_i8(vec![1, 2, 3, 4], 0)?;
    let mut registry = OpRegistry::new();
    registry.register(OpKind::Softmax, common::as_ops(mock))?;
    let exec_node = ExecNode::bind(&registry, &graph, 0)?;
    Ok((graph, exec_node))
}

#[test]
fn lifecycle_full_sequence() -> Result<()> {
    let mock = MockOps::new("mock", OpsScore::BEST);
    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    assert_eq!(exec_node.state(), NodeState::Bound);
    assert_eq!(exec_node.backend_name(), "mock");

    exec_node.init(&graph)?;
    assert_eq!(exec_node.state(), NodeState::Initialized);
    exec_node.prerun(&mut graph)?;
    assert_eq!(exec_node.state(), NodeState::Ready);
    for _ in 0..3 {
        exec_node.run(&mut graph)?;
        assert_eq!(exec_node.state(), NodeState::Ready);
    }
    exec_node.reshape(&mut graph)?;
    assert_eq!(exec_node.state(), NodeState::Ready);
    exec_node.postrun(&mut graph)?;
    assert_eq!(exec_node.state(), NodeState::Finalized);
    exec_node.release(&graph)?;
    assert_eq!(exec_node.state(), NodeState::Released);

    use LifecycleStep::*;
    assert_eq!(
        mock.steps(),
        vec![Init, Prerun, Run, Run, Run, Reshape, Postrun, Release]
    );
    Ok(())
}

#[test]
fn lifecycle_run_before_prerun_is_invalid_state() -> Result<()> {
    let mock = MockOps::new("mock", OpsScore::BEST);
    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    exec_node.init(&graph)?;

    let err = exec_node.run(&mut graph).unwrap_err();
    assert!(matches!(
        err,
        ExecError::InvalidState {
            step: LifecycleStep::Run,
            state: NodeState::Initialized,
            ..
        }
    ));
    assert_eq!(exec_node.invoke(LifecycleStep::Run, &mut graph), -1);
    assert_eq!(exec_node.invoke(LifecycleStep::Reshape, &mut graph), -1);
    assert_eq!(exec_node.state(), NodeState::Initialized);
    assert_eq!(mock.steps(), vec![LifecycleStep::Init]);
    Ok(())
}

#[test]
fn lifecycle_everything_after_release_fails() -> Result<()> {
    let mock = MockOps::new("mock", OpsScore::BEST);
    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    assert_eq!(exec_node.invoke(LifecycleStep::Init, &mut graph), STATUS_OK);
    assert_eq!(exec_node.invoke(LifecycleStep::Release, &mut graph), STATUS_OK);

    for step in [
        LifecycleStep::Init,
        LifecycleStep::Prerun,
        LifecycleStep::Reshape,
        LifecycleStep::Run,
        LifecycleStep::Postrun,
        LifecycleStep::Release,
    ] {
        assert_eq!(exec_node.invoke(step, &mut graph), -1, "{}", step);
    }
    assert_eq!(mock.steps(), vec![LifecycleStep::Init, LifecycleStep::Release]);
    Ok(())
}

#[test]
fn lifecycle_failed_run_returns_to_ready() -> Result<()> {
    let mock = MockOps::failing_run("flaky", OpsScore::BEST);
    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    exec_node.init(&graph)?;
    exec_node.prerun(&mut graph)?;

    assert_eq!(exec_node.invoke(LifecycleStep::Run, &mut graph), -22);
    assert_eq!(exec_node.state(), NodeState::Ready);
    assert!(exec_node.run(&mut graph).is_err());
    exec_node.postrun(&mut graph)?;
    assert_eq!(exec_node.state(), NodeState::Finalized);
    Ok(())
}

#[test]
fn lifecycle_prerun_again_after_postrun() -> Result<()> {
    let mock = MockOps::new("mock", OpsScore::BEST);
    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    exec_node.init(&graph)?;
    exec_node.prerun(&mut graph)?;
    exec_node.postrun(&mut graph)?;
    exec_node.prerun(&mut graph)?;
    exec_node.run(&mut graph)?;
    assert_eq!(exec_node.state(), NodeState::Ready);
    assert!(exec_node.init(&graph).is_err());
    Ok(())
}

#[test]
fn lifecycle_release_from_any_live_state() -> Result<()> {
    let mock = MockOps::new("mock", OpsScore::BEST);
    let (graph, mut exec_node) = bound_mock(&mock)?;
    exec_node.release(&graph)?;
    assert_eq!(exec_node.state(), NodeState::Released);

    let (mut graph, mut exec_node) = bound_mock(&mock)?;
    exec_node.init(&graph)?;
    exec_node.prerun(&mut graph)?;
    exec_node.release(&graph)?;
    assert_eq!(exec_node.state(), NodeState::Released);
    Ok(())
}

#[test]
fn lifecycle_defaults_are_no_ops() -> Result<()> {
    let (mut graph, _, y) = common::softmax_graph_i8(vec![1, 2], 0)?;
    let mut exec_node = ExecNode::with_ops(0, std::sync::Arc::new(ScoreOnly));
    for step in [
        LifecycleStep::Init,
        LifecycleStep::Prerun,
        LifecycleStep::Reshape,
        LifecycleStep::Run,
        LifecycleStep::Postrun,
        LifecycleStep::Release,
    ] {
        assert_eq!(exec_node.invoke(step, &mut graph), STATUS_OK, "{}", step);
    }
    assert_eq!(common::i8_data(&graph, y)?, vec![0, 0]);
    Ok(())
}

#[test]
fn lifecycle_private_state_is_dropped_on_release() -> Result<()> {
    let (mut graph, _, _) = common::softmax_graph_i8(vec![1, 2], 0)?;
    let mut exec_node = ExecNode::with_ops(0, std::sync::Arc::new(ScoreOnly));
    exec_node.set_priv(17u32);
    assert_eq!(exec_node.priv_ref::<u32>(), Some(&17));
    assert_eq!(exec_node.priv_ref::<u64>(), None);
    exec_node.init(&graph)?;
    exec_node.prerun(&mut graph)?;
    exec_node.release(&graph)?;
    assert!(exec_node.priv_ref::<u32>().is_none());
    Ok(())
}

#[test]
fn lifecycle_bind_without_candidates_fails() -> Result<()> {
    let (graph, _, _) = common::softmax_graph_i8(vec![1, 2], 0)?;
    let err = ExecNode::bind(&OpRegistry::new(), &graph, 0).unwrap_err();
    assert_eq!(err.status_code(), -19);
    assert!(ExecNode::bind(&OpRegistry::new(), &graph, 5).is_err());
    Ok(())
}
