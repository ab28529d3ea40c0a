pub mod relay;

pub use relay::{HttpRelay, RelayResponse, UploadRelay};

use std::time::Instant;

use crate::aggregate::{self, AnalysisReport};
use crate::errors::{TransportError, UploadError};
use crate::history::HistoryStore;
use crate::models::{HistoryEntry, InferenceResult};
use uuid::Uuid;

/// Opaque, monotonically increasing token identifying one upload attempt.
/// A token minted later supersedes every earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Where the orchestrator currently stands.
#[derive(Debug, Clone)]
pub enum UploadState {
    Idle,
    Submitting,
    Succeeded(Box<CompletedUpload>),
    Failed {
        /// Human-readable description of what went wrong.
        message: String,
        /// Raw diagnostic detail from the relay, verbatim, when available.
        detail: Option<String>,
    },
}

/// Validated outcome of one successful upload.
#[derive(Debug, Clone)]
pub struct CompletedUpload {
    /// The payload as the relay returned it.
    pub result: InferenceResult,
    /// Statistics re-derived from the detection list.
    pub report: AnalysisReport,
    /// Id of the history entry recorded for this upload.
    pub history_id: Uuid,
}

struct Pending {
    token: u64,
    file_name: String,
    started: Instant,
}

/// Owns the life cycle of one upload at a time.
///
/// States move Idle -> Submitting -> Succeeded or Failed; a new upload from
/// any state restarts the machine and discards the previous outcome. There
/// is no retry and no queue: issuing a new upload while one is in flight
/// supersedes it, and the superseded response is dropped on arrival.
pub struct UploadOrchestrator<R: UploadRelay> {
    relay: R,
    state: UploadState,
    latest: u64,
    in_flight: Option<Pending>,
    history: HistoryStore,
}

impl<R: UploadRelay> UploadOrchestrator<R> {
    pub fn new(relay: R) -> Self {
        Self {
            relay,
            state: UploadState::Idle,
            latest: 0,
            in_flight: None,
            history: HistoryStore::new(),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Move to Submitting and mint the token the eventual response must
    /// present. Any previous outcome is discarded.
    pub fn begin(&mut self, file_name: &str) -> RequestToken {
        self.latest += 1;
        self.state = UploadState::Submitting;
        self.in_flight = Some(Pending {
            token: self.latest,
            file_name: file_name.to_string(),
            started: Instant::now(),
        });
        RequestToken(self.latest)
    }

    /// Apply the outcome of the attempt identified by `token`.
    ///
    /// A stale token, superseded by a newer `begin`, is dropped without
    /// touching the current state. Success requires the relay reply to
    /// carry a payload that passes every ingestion check; on success a
    /// history entry is recorded.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<RelayResponse, TransportError>,
    ) -> &UploadState {
        if token.0 != self.latest {
            log::debug!(
                "dropping stale upload response (token {}, latest {})",
                token.0,
                self.latest
            );
            return &self.state;
        }
        let Some(pending) = self.in_flight.take() else {
            // Same token resolved twice; the first resolution already won
            return &self.state;
        };

        match ingest(outcome) {
            Ok(result) => {
                let elapsed = pending.started.elapsed().as_secs_f64();
                let report = aggregate::report(&result.detections, Some(elapsed));
                if report.summary != result.summary {
                    log::warn!(
                        "backend summary ({} mitotic / {} other) differs from derived counts ({} / {})",
                        result.summary.mitotic_count,
                        result.summary.non_mitotic_count,
                        report.summary.mitotic_count,
                        report.summary.non_mitotic_count
                    );
                }

                let entry = HistoryEntry::new(
                    pending.file_name,
                    result.detections.len(),
                    report.average_confidence,
                    elapsed,
                );
                let history_id = entry.id;
                if let Err(e) = self.history.insert(entry) {
                    // Freshly minted v4 ids do not collide in practice
                    log::error!("history entry dropped: {e}");
                }

                self.state = UploadState::Succeeded(Box::new(CompletedUpload {
                    result,
                    report,
                    history_id,
                }));
            }
            Err(err) => {
                self.state = failure_state(err);
            }
        }
        &self.state
    }

    /// Drive one full upload: begin, call the relay, resolve.
    pub async fn submit(&mut self, file_name: &str, bytes: &[u8]) -> &UploadState {
        let token = self.begin(file_name);
        let outcome = self.relay.submit(file_name, bytes).await;
        self.resolve(token, outcome)
    }
}

/// Turn a raw relay outcome into a validated result.
fn ingest(outcome: Result<RelayResponse, TransportError>) -> Result<InferenceResult, UploadError> {
    let reply = outcome?;
    if !reply.is_success() {
        return Err(TransportError::Status {
            status: reply.status,
            body: reply.body,
        }
        .into());
    }
    let result = InferenceResult::from_json(&reply.body)?;
    Ok(result)
}

fn failure_state(err: UploadError) -> UploadState {
    match err {
        UploadError::Transport(TransportError::Status { status, body }) => UploadState::Failed {
            message: format!("relay returned status {status}"),
            detail: Some(body),
        },
        UploadError::Transport(err @ TransportError::Unreachable(_)) => UploadState::Failed {
            message: err.to_string(),
            detail: None,
        },
        UploadError::Validation(err) => UploadState::Failed {
            message: format!("invalid inference payload: {err}"),
            detail: None,
        },
    }
}
