use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::backoff::BackoffPolicy;
use super::job::{DEFAULT_FAILURE_REASON, PollAttempt, PollJob, PollOutcome};
use crate::transcription::{JobStatus, StatusChecker, StatusReport};

/// Awaits an asynchronous job with capped exponential backoff.
///
/// Checks are strictly sequential. The sleep between checks is the only
/// suspension point besides the check itself, so dropping the returned
/// future is a clean way for callers to cancel.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    policy: BackoffPolicy,
}

impl Poller {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Poll `job` until it completes, fails, or attempts run out.
    pub async fn poll(&self, job: &PollJob, checker: &impl StatusChecker) -> PollOutcome {
        self.poll_observed(job, checker, |_| {}).await
    }

    /// Same as [`poll`](Self::poll), calling `on_attempt` after every check.
    ///
    /// - `completed` returns at once with the payload, no trailing delay.
    /// - `failed` returns at once; never retried.
    /// - queued, processing and check errors use up an attempt and back off.
    /// - Running out of attempts yields [`PollOutcome::TimedOut`].
    pub async fn poll_observed<F>(
        &self,
        job: &PollJob,
        checker: &impl StatusChecker,
        mut on_attempt: F,
    ) -> PollOutcome
    where
        F: FnMut(&PollAttempt),
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 0;
        let mut delay_ms = self.policy.first_delay();
        let mut delay_before_ms = 0;

        while attempt < max_attempts {
            let number = attempt + 1;
            let checked = checker.check_status(job.job_id()).await;
            on_attempt(&PollAttempt::from_check(number, delay_before_ms, &checked));

            match checked {
                Ok(StatusReport {
                    status: JobStatus::Completed,
                    payload,
                    ..
                }) => {
                    info!(
                        job_id = job.job_id(),
                        attempts = number,
                        elapsed_ms = job.elapsed().num_milliseconds(),
                        "job completed"
                    );
                    return PollOutcome::Completed { payload };
                }
                Ok(StatusReport {
                    status: JobStatus::Failed,
                    reason,
                    ..
                }) => {
                    let reason = reason.unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string());
                    info!(job_id = job.job_id(), attempts = number, %reason, "job failed upstream");
                    return PollOutcome::Failed { reason };
                }
                Ok(report) => {
                    debug!(
                        job_id = job.job_id(),
                        attempt = number,
                        max_attempts,
                        status = %report.status,
                        "job not finished"
                    );
                }
                Err(e) => {
                    warn!(
                        job_id = job.job_id(),
                        attempt = number,
                        max_attempts,
                        error = %e,
                        "status check failed, will retry"
                    );
                }
            }

            attempt += 1;
            if attempt < max_attempts {
                sleep(Duration::from_millis(delay_ms)).await;
                delay_before_ms = delay_ms;
                delay_ms = self.policy.next_delay(delay_ms);
            }
        }

        info!(
            job_id = job.job_id(),
            attempts = max_attempts,
            elapsed_ms = job.elapsed().num_milliseconds(),
            "gave up waiting for job"
        );
        PollOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::job::AttemptStatus;
    use crate::transcription::TranscriptionError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Replays a fixed script of check results; repeats `fallback` once the
    /// script runs dry.
    struct ScriptedChecker {
        script: Mutex<VecDeque<Result<StatusReport, TranscriptionError>>>,
        fallback: JobStatus,
        calls: AtomicU32,
    }

    impl ScriptedChecker {
        fn new(script: Vec<Result<StatusReport, TranscriptionError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: JobStatus::Processing,
                calls: AtomicU32::new(0),
            }
        }

        fn always(status: JobStatus) -> Self {
            Self {
                fallback: status,
                ..Self::new(Vec::new())
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusChecker for ScriptedChecker {
        async fn check_status(&self, _job_id: &str) -> Result<StatusReport, TranscriptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(report(self.fallback)))
        }
    }

    fn report(status: JobStatus) -> StatusReport {
        StatusReport {
            status,
            payload: None,
            reason: None,
        }
    }

    fn completed(payload: serde_json::Value) -> Result<StatusReport, TranscriptionError> {
        Ok(StatusReport {
            status: JobStatus::Completed,
            payload: Some(payload),
            reason: None,
        })
    }

    fn transient() -> Result<StatusReport, TranscriptionError> {
        Err(TranscriptionError::ApiError {
            status: 503,
            message: "upstream unavailable".into(),
        })
    }

    /// Paused-clock sleeps land on millisecond ticks; allow for rounding.
    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(20),
            "expected ~{expected:?}, got {elapsed:?}"
        );
    }

    fn scenario_policy() -> BackoffPolicy {
        BackoffPolicy {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            max_attempts: 5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completes_on_fifth_attempt_with_capped_delays() {
        let checker = ScriptedChecker::new(vec![
            Ok(report(JobStatus::Processing)),
            Ok(report(JobStatus::Processing)),
            Ok(report(JobStatus::Processing)),
            Ok(report(JobStatus::Processing)),
            completed(json!({"text": "hello world"})),
        ]);
        let poller = Poller::new(scenario_policy());
        let job = PollJob::new("job_1");

        let mut attempts = Vec::new();
        let start = Instant::now();
        let outcome = poller
            .poll_observed(&job, &checker, |a| attempts.push(a.clone()))
            .await;

        assert_eq!(
            outcome,
            PollOutcome::Completed {
                payload: Some(json!({"text": "hello world"}))
            }
        );
        assert_eq!(checker.calls(), 5);
        let delays: Vec<u64> = attempts.iter().map(|a| a.delay_before_ms).collect();
        assert_eq!(delays, vec![0, 1000, 2000, 4000, 5000]);
        // no trailing sleep after the completing check
        assert_elapsed(start, Duration::from_millis(12_000));
    }

    #[tokio::test(start_paused = true)]
    async fn always_processing_times_out_after_max_attempts() {
        let checker = ScriptedChecker::always(JobStatus::Processing);
        let poller = Poller::new(scenario_policy());

        let start = Instant::now();
        let outcome = poller.poll(&PollJob::new("job_2"), &checker).await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(checker.calls(), 5);
        assert_elapsed(start, scenario_policy().worst_case_wait());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_on_second_attempt_stops_immediately() {
        let checker = ScriptedChecker::new(vec![
            Ok(report(JobStatus::Queued)),
            Ok(StatusReport {
                status: JobStatus::Failed,
                payload: None,
                reason: Some("unsupported codec".into()),
            }),
        ]);
        let poller = Poller::new(scenario_policy());

        let start = Instant::now();
        let outcome = poller.poll(&PollJob::new("job_3"), &checker).await;

        assert_eq!(
            outcome,
            PollOutcome::Failed {
                reason: "unsupported codec".into()
            }
        );
        assert_eq!(checker.calls(), 2);
        assert_elapsed(start, Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_without_reason_uses_default() {
        let checker = ScriptedChecker::always(JobStatus::Failed);
        let outcome = Poller::new(scenario_policy())
            .poll(&PollJob::new("job_4"), &checker)
            .await;
        assert_eq!(
            outcome,
            PollOutcome::Failed {
                reason: DEFAULT_FAILURE_REASON.into()
            }
        );
        assert_eq!(checker.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_consume_attempts_without_aborting() {
        let checker = ScriptedChecker::new(vec![
            transient(),
            transient(),
            transient(),
            completed(json!("done")),
        ]);
        let poller = Poller::new(scenario_policy());

        let mut seen = Vec::new();
        let outcome = poller
            .poll_observed(&PollJob::new("job_5"), &checker, |a| seen.push(a.clone()))
            .await;

        assert_eq!(
            outcome,
            PollOutcome::Completed {
                payload: Some(json!("done"))
            }
        );
        assert_eq!(checker.calls(), 4);
        assert_eq!(seen.iter().filter(|a| a.is_transient_error()).count(), 3);
        assert_eq!(seen[3].status, AttemptStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_alone_time_out() {
        let checker = ScriptedChecker::new((0..5).map(|_| transient()).collect());
        let outcome = Poller::new(scenario_policy())
            .poll(&PollJob::new("job_6"), &checker)
            .await;
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(checker.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_completion_never_sleeps() {
        let checker = ScriptedChecker::always(JobStatus::Completed);
        let start = Instant::now();
        let outcome = Poller::default().poll(&PollJob::new("job_7"), &checker).await;
        assert_eq!(outcome, PollOutcome::Completed { payload: None });
        assert_eq!(checker.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_numbered_sequentially() {
        let checker = ScriptedChecker::always(JobStatus::Queued);
        let mut numbers = Vec::new();
        Poller::new(scenario_policy())
            .poll_observed(&PollJob::new("job_8"), &checker, |a| {
                numbers.push(a.attempt_number)
            })
            .await;
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_max_attempts_for_any_policy() {
        let policies = [
            BackoffPolicy {
                max_attempts: 1,
                ..scenario_policy()
            },
            BackoffPolicy {
                initial_delay_ms: 0,
                max_delay_ms: 0,
                backoff_multiplier: 1.0,
                max_attempts: 7,
            },
            BackoffPolicy {
                initial_delay_ms: 250,
                max_delay_ms: 5000,
                backoff_multiplier: 1.5,
                max_attempts: 20,
            },
            BackoffPolicy::default(),
        ];
        for policy in policies {
            let checker = ScriptedChecker::always(JobStatus::Processing);
            let outcome = Poller::new(policy.clone())
                .poll(&PollJob::new("job_9"), &checker)
                .await;
            assert_eq!(outcome, PollOutcome::TimedOut);
            assert_eq!(checker.calls(), policy.max_attempts, "{policy:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_times_out_without_checking() {
        let checker = ScriptedChecker::always(JobStatus::Completed);
        let policy = BackoffPolicy {
            max_attempts: 0,
            ..scenario_policy()
        };
        let outcome = Poller::new(policy).poll(&PollJob::new("job_10"), &checker).await;
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(checker.calls(), 0);
    }
}
