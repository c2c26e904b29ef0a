//! Coordinator integration tests.
//!
//! Exercises submission lifecycle, partial failure, cancellation, and the
//! stale-response guard through the public API, against the mock executor.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sqldesk::coordinator::{
    CoordinatorState, ExecutionRequest, QueryCoordinator, ResultRecord, RunCounters,
    SubmitOutcome,
};
use sqldesk::remote::{FailingExecutor, MockExecutor};

fn records(outcome: SubmitOutcome) -> Vec<ResultRecord> {
    match outcome {
        SubmitOutcome::Completed(records) => records,
        other => panic!("Expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_result_count_invariant_with_error_at_each_position() {
    // For a batch of n statements with proceed-after-error disabled, an error
    // at position k leaves k executed records and n - k - 1 skipped ones,
    // with the total always n.
    let sql = "select a; select b; select c; select d";
    let n = 4;

    for (k, failing) in ["select a", "select b", "select c", "select d"]
        .iter()
        .enumerate()
    {
        let executor = MockExecutor::new().with_error(*failing, "boom");
        let coordinator = QueryCoordinator::new(Arc::new(executor));

        let batch = records(
            coordinator
                .submit(ExecutionRequest::multi(sql, false))
                .await
                .unwrap(),
        );

        assert_eq!(batch.len(), n, "error at {k}");
        for (index, record) in batch.iter().enumerate() {
            match index.cmp(&k) {
                std::cmp::Ordering::Less => {
                    assert!(matches!(record, ResultRecord::Success { .. }))
                }
                std::cmp::Ordering::Equal => assert!(record.is_error()),
                std::cmp::Ordering::Greater => assert!(record.is_skipped()),
            }
        }
    }
}

#[tokio::test]
async fn test_batch_order_matches_statement_order() {
    let executor = Arc::new(MockExecutor::new());
    let coordinator = QueryCoordinator::new(executor.clone());

    coordinator
        .submit(ExecutionRequest::multi(
            "select 'x;y'; select 2 /* a; b */; select 3",
            true,
        ))
        .await
        .unwrap();

    // The executor saw the split statements, in source order.
    assert_eq!(
        executor.submitted_batches(),
        vec![vec![
            "select 'x;y'".to_string(),
            "select 2 /* a; b */".to_string(),
            "select 3".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_second_submit_discards_first_response() {
    let executor = Arc::new(MockExecutor::new());
    executor.hold("select slow");
    let coordinator = Arc::new(QueryCoordinator::new(executor.clone()));

    let first = tokio::spawn({
        let coordinator = coordinator.clone();
        async move {
            coordinator
                .submit(ExecutionRequest::multi("select slow", true))
                .await
        }
    });
    tokio::task::yield_now().await;

    let second = records(
        coordinator
            .submit(ExecutionRequest::multi("select fast", true))
            .await
            .unwrap(),
    );
    assert_eq!(second.len(), 1);

    let visible_before = coordinator.latest_batch();
    let counters_before = coordinator.counters();

    // The first submission's response arrives late and must change nothing.
    executor.release("select slow");
    assert_eq!(first.await.unwrap().unwrap(), SubmitOutcome::Cancelled);

    assert_eq!(coordinator.latest_batch(), visible_before);
    assert_eq!(coordinator.counters(), counters_before);
    assert_eq!(coordinator.state(), CoordinatorState::Completed);
}

#[tokio::test]
async fn test_cancel_does_not_update_counters() {
    let executor = Arc::new(MockExecutor::new());
    executor.hold("select slow");
    let coordinator = Arc::new(QueryCoordinator::new(executor.clone()));

    let task = tokio::spawn({
        let coordinator = coordinator.clone();
        async move {
            coordinator
                .submit(ExecutionRequest::multi("select slow; select 2", true))
                .await
        }
    });
    tokio::task::yield_now().await;

    coordinator.cancel();
    assert_eq!(task.await.unwrap().unwrap(), SubmitOutcome::Cancelled);

    assert_eq!(coordinator.state(), CoordinatorState::Cancelled);
    assert_eq!(coordinator.counters().executed, 0);
    assert_eq!(coordinator.counters().errored, 0);
    assert!(coordinator.latest_batch().is_none());

    executor.release("select slow");
}

#[tokio::test]
async fn test_transport_failure_publishes_nothing() {
    let coordinator = QueryCoordinator::new(Arc::new(FailingExecutor));

    let err = coordinator
        .submit(ExecutionRequest::multi("select 1; select 2", true))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Transport Error");
    assert_eq!(coordinator.state(), CoordinatorState::Failed);
    assert!(coordinator.latest_batch().is_none());
}

#[tokio::test]
async fn test_raw_mode_bypasses_splitting() {
    let executor = Arc::new(MockExecutor::new());
    let coordinator = QueryCoordinator::new(executor.clone());

    let batch = records(
        coordinator
            .submit(ExecutionRequest::raw("select 1; select 2;"))
            .await
            .unwrap(),
    );

    // The text was not split; no batch request was made.
    assert!(executor.submitted_batches().is_empty());
    assert_eq!(executor.call_count(), 1);
    assert_eq!(batch.len(), 1);
}

#[tokio::test]
async fn test_counters_shared_across_coordinator_lifetimes() {
    // Counters belong to the session: a replacement coordinator for the same
    // session keeps accumulating into them.
    let counters = Arc::new(RunCounters::new());

    let first = QueryCoordinator::with_counters(Arc::new(MockExecutor::new()), counters.clone());
    first
        .submit(ExecutionRequest::multi("select 1; select 2", true))
        .await
        .unwrap();
    drop(first);

    let second = QueryCoordinator::with_counters(
        Arc::new(MockExecutor::new().with_error("select bad", "nope")),
        counters.clone(),
    );
    second
        .submit(ExecutionRequest::multi("select bad", true))
        .await
        .unwrap();

    assert_eq!(counters.snapshot().executed, 3);
    assert_eq!(counters.snapshot().errored, 1);
}
