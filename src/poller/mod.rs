mod backoff;
mod bounded;
mod job;

pub use backoff::BackoffPolicy;
pub use bounded::Poller;
pub use job::{AttemptStatus, PollAttempt, PollJob, PollOutcome};
