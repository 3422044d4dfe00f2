use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transcription::{JobStatus, StatusReport, TranscriptionError};

/// Reason reported when the provider marks a job failed without saying why.
pub const DEFAULT_FAILURE_REASON: &str = "transcription failed";

/// A transcription job being awaited. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollJob {
    job_id: String,
    submitted_at: DateTime<Utc>,
}

impl PollJob {
    /// Stamp a freshly submitted (or adopted) job with the current time.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self::submitted_at(job_id, Utc::now())
    }

    pub fn submitted_at(job_id: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    #[allow(dead_code)]
    pub fn submitted(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Wall-clock time since submission.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.submitted_at
    }
}

/// What a single status check observed.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// The check itself failed (transport error, non-2xx, bad body).
    TransientError(String),
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptStatus::Queued => write!(f, "queued"),
            AttemptStatus::Processing => write!(f, "processing"),
            AttemptStatus::Completed => write!(f, "completed"),
            AttemptStatus::Failed => write!(f, "failed"),
            AttemptStatus::TransientError(msg) => write!(f, "check error: {msg}"),
        }
    }
}

/// One status check inside the polling loop. Handed to observers by
/// reference and never kept by the poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PollAttempt {
    /// 1-based, strictly increasing within a poll.
    pub attempt_number: u32,
    /// Delay slept right before this check; 0 for the first one.
    pub delay_before_ms: u64,
    pub status: AttemptStatus,
    pub result_payload: Option<Value>,
}

impl PollAttempt {
    pub(crate) fn from_check(
        attempt_number: u32,
        delay_before_ms: u64,
        checked: &Result<StatusReport, TranscriptionError>,
    ) -> Self {
        let (status, result_payload) = match checked {
            Ok(report) => {
                let status = match report.status {
                    JobStatus::Queued => AttemptStatus::Queued,
                    JobStatus::Processing => AttemptStatus::Processing,
                    JobStatus::Completed => AttemptStatus::Completed,
                    JobStatus::Failed => AttemptStatus::Failed,
                };
                (status, report.payload.clone())
            }
            Err(e) => (AttemptStatus::TransientError(e.to_string()), None),
        };
        Self {
            attempt_number,
            delay_before_ms,
            status,
            result_payload,
        }
    }

    #[allow(dead_code)]
    pub fn is_transient_error(&self) -> bool {
        matches!(self.status, AttemptStatus::TransientError(_))
    }
}

/// Terminal result of polling one job.
///
/// Serializes to the caller-facing shape
/// `{ "outcome": "completed" | "failed" | "timeout", "payload"?, "reason"? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Failed {
        reason: String,
    },
    /// Attempts ran out before the job finished. Distinct from `Failed`:
    /// the job may still complete upstream.
    #[serde(rename = "timeout")]
    TimedOut,
}

impl PollOutcome {
    /// Suggested HTTP status for handlers that embed the poller.
    #[allow(dead_code)]
    pub fn http_status(&self) -> u16 {
        match self {
            PollOutcome::Completed { .. } => 200,
            PollOutcome::Failed { .. } => 502,
            PollOutcome::TimedOut => 408,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            PollOutcome::Completed { .. } => 0,
            PollOutcome::Failed { .. } => 1,
            PollOutcome::TimedOut => 2,
        }
    }
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollOutcome::Completed { .. } => write!(f, "completed"),
            PollOutcome::Failed { reason } => write!(f, "failed: {reason}"),
            PollOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}
