//! Integration tests for the upload state machine.
//!
//! Tests cover:
//! - One full successful cycle and its history entry
//! - Non-success relay statuses surfaced verbatim in Failed
//! - Unreachable relays
//! - Payload validation failures terminating in Failed
//! - Stale responses dropped by the token check
//! - A new upload discarding the previous outcome

mod common;

use common::*;
use mitoscan::errors::TransportError;
use mitoscan::upload::RelayResponse;

#[test]
fn test_initial_state_is_idle() {
    let orchestrator = UploadOrchestrator::new(UnreachableRelay);
    assert!(matches!(orchestrator.state(), UploadState::Idle));
    assert!(orchestrator.history().is_empty());
}

#[tokio::test]
async fn test_successful_upload_records_history() -> anyhow::Result<()> {
    let result = make_result(vec![
        confirmed_detection(0, 0.9),
        make_detection(1, "non_mitotic", 0.4),
    ]);
    let mut orchestrator = UploadOrchestrator::new(StaticRelay::ok(&result));

    // 1. Run one full upload cycle
    let state = orchestrator.submit("slide_01.png", b"fake image bytes").await;
    let done = match state {
        UploadState::Succeeded(done) => done.clone(),
        other => anyhow::bail!("expected success, got {other:?}"),
    };

    // 2. The payload and the derived report travel together
    assert_eq!(done.result, result);
    assert_eq!(done.report.summary.total_candidates, 2);
    assert_eq!(done.report.summary.mitotic_count, 1);
    assert_eq!(done.report.confirmed_count, 1);

    // 3. The completed upload is on record
    assert_eq!(orchestrator.history().len(), 1);
    let entry = orchestrator
        .history()
        .select(done.history_id)
        .expect("history entry recorded");
    assert_eq!(entry.file_name, "slide_01.png");
    assert_eq!(entry.detection_count, 2);
    assert!(entry.processing_time >= 0.0);
    Ok(())
}

#[tokio::test]
async fn test_error_status_surfaces_body_verbatim() -> anyhow::Result<()> {
    let mut orchestrator = UploadOrchestrator::new(StaticRelay::error(
        500,
        "Inference backend error: model not loaded",
    ));

    let state = orchestrator.submit("slide.png", b"bytes").await;

    match state {
        UploadState::Failed { message, detail } => {
            assert!(message.contains("500"), "status must be visible, got: {message}");
            assert_eq!(
                detail.as_deref(),
                Some("Inference backend error: model not loaded")
            );
        }
        other => anyhow::bail!("expected failure, got {other:?}"),
    }
    assert!(
        orchestrator.history().is_empty(),
        "failed uploads leave no history entry"
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_relay_fails() -> anyhow::Result<()> {
    let mut orchestrator = UploadOrchestrator::new(UnreachableRelay);

    let state = orchestrator.submit("slide.png", b"bytes").await;

    match state {
        UploadState::Failed { message, detail } => {
            assert!(message.contains("unreachable"), "got: {message}");
            assert!(detail.is_none());
        }
        other => anyhow::bail!("expected failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_payload_fails_validation() -> anyhow::Result<()> {
    // Summary disagrees with the detection list
    let mut result = make_result(vec![make_detection(0, "mitotic", 0.9)]);
    result.summary.total_candidates = 5;
    result.summary.non_mitotic_count = 4;
    let mut orchestrator = UploadOrchestrator::new(StaticRelay::ok(&result));

    let state = orchestrator.submit("slide.png", b"bytes").await;

    match state {
        UploadState::Failed { message, .. } => {
            assert!(
                message.contains("invalid inference payload"),
                "got: {message}"
            );
        }
        other => anyhow::bail!("expected failure, got {other:?}"),
    }
    assert!(orchestrator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stale_response_ignored() -> anyhow::Result<()> {
    let first_result = make_result(vec![make_detection(0, "mitotic", 0.9)]);
    let second_result = make_result(vec![
        make_detection(0, "non_mitotic", 0.3),
        make_detection(1, "non_mitotic", 0.2),
    ]);
    // The relay is not exercised; outcomes are fed in by hand
    let mut orchestrator = UploadOrchestrator::new(UnreachableRelay);

    // 1. Upload #2 supersedes #1 while #1 is still in flight
    let token1 = orchestrator.begin("first.png");
    let token2 = orchestrator.begin("second.png");

    // 2. #2 resolves first
    let reply2 = RelayResponse {
        status: 200,
        body: serde_json::to_string(&second_result)?,
    };
    orchestrator.resolve(token2, Ok(reply2));
    assert!(matches!(orchestrator.state(), UploadState::Succeeded(_)));

    // 3. #1 arrives late and must be dropped
    let reply1 = RelayResponse {
        status: 200,
        body: serde_json::to_string(&first_result)?,
    };
    orchestrator.resolve(token1, Ok(reply1));

    let done = match orchestrator.state() {
        UploadState::Succeeded(done) => done,
        other => anyhow::bail!("expected success, got {other:?}"),
    };
    assert_eq!(
        done.result.detections.len(),
        2,
        "the final state reflects upload #2 only"
    );
    assert_eq!(orchestrator.history().len(), 1, "only upload #2 is recorded");
    let entry = orchestrator
        .history()
        .select(done.history_id)
        .expect("entry for upload #2");
    assert_eq!(entry.file_name, "second.png");
    Ok(())
}

#[tokio::test]
async fn test_superseded_response_keeps_submitting() -> anyhow::Result<()> {
    let result = make_result(vec![make_detection(0, "mitotic", 0.9)]);
    let mut orchestrator = UploadOrchestrator::new(UnreachableRelay);

    let token1 = orchestrator.begin("first.png");
    let _token2 = orchestrator.begin("second.png");

    // A stale success must not complete upload #2
    let reply = RelayResponse {
        status: 200,
        body: serde_json::to_string(&result)?,
    };
    orchestrator.resolve(token1, Ok(reply));

    assert!(matches!(orchestrator.state(), UploadState::Submitting));
    assert!(orchestrator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_resolving_same_token_twice_is_inert() -> anyhow::Result<()> {
    let result = make_result(vec![make_detection(0, "mitotic", 0.9)]);
    let mut orchestrator = UploadOrchestrator::new(UnreachableRelay);

    let token = orchestrator.begin("one.png");
    let reply = RelayResponse {
        status: 200,
        body: serde_json::to_string(&result)?,
    };
    orchestrator.resolve(token, Ok(reply));
    assert!(matches!(orchestrator.state(), UploadState::Succeeded(_)));

    // A duplicate arrival of the same token changes nothing
    orchestrator.resolve(token, Err(TransportError::Unreachable("late duplicate".into())));

    assert!(matches!(orchestrator.state(), UploadState::Succeeded(_)));
    assert_eq!(orchestrator.history().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_new_upload_discards_previous_outcome() -> anyhow::Result<()> {
    let result = make_result(vec![make_detection(0, "mitotic", 0.9)]);
    let mut orchestrator = UploadOrchestrator::new(StaticRelay::ok(&result));

    orchestrator.submit("one.png", b"bytes").await;
    assert!(matches!(orchestrator.state(), UploadState::Succeeded(_)));

    // Starting the next upload restarts the machine
    orchestrator.begin("two.png");
    assert!(matches!(orchestrator.state(), UploadState::Submitting));
    assert_eq!(
        orchestrator.history().len(),
        1,
        "history keeps the completed upload"
    );
    Ok(())
}
