use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VoxpollError;

/// Backoff and attempt ceiling for the bounded poller.
///
/// Delays are whole milliseconds. Each delay is the previous one times
/// `backoff_multiplier`, capped at `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay after the first unfinished check.
    pub initial_delay_ms: u64,
    /// Ceiling for any single delay.
    pub max_delay_ms: u64,
    /// Growth factor applied after every unfinished check.
    pub backoff_multiplier: f64,
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            max_attempts: 60,
        }
    }
}

impl BackoffPolicy {
    /// Reject policies that would never poll or would shrink delays.
    pub fn validate(&self) -> Result<(), VoxpollError> {
        if self.max_attempts == 0 {
            return Err(VoxpollError::Config("max_attempts must be at least 1".into()));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(VoxpollError::Config(format!(
                "initial_delay_ms ({}) exceeds max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(VoxpollError::Config(format!(
                "backoff_multiplier must be a finite number >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// First delay, clamped to the ceiling.
    pub fn first_delay(&self) -> u64 {
        self.initial_delay_ms.min(self.max_delay_ms)
    }

    /// Delay that follows `current_ms`. Never smaller than `current_ms` and
    /// never above `max_delay_ms`, even for a policy that fails `validate`.
    pub fn next_delay(&self, current_ms: u64) -> u64 {
        let grown = current_ms as f64 * self.backoff_multiplier;
        let next = if grown.is_finite() && grown < self.max_delay_ms as f64 {
            // float -> int casts saturate; NaN maps to 0 and is lifted by max below
            grown as u64
        } else {
            self.max_delay_ms
        };
        next.max(current_ms).min(self.max_delay_ms)
    }

    /// The delay slept after the `attempt`-th unfinished check (1-based).
    #[allow(dead_code)]
    pub fn delay_after(&self, attempt: u32) -> u64 {
        self.delays()
            .nth(attempt.saturating_sub(1) as usize)
            .unwrap_or(self.max_delay_ms)
    }

    /// Infinite sequence of inter-attempt delays.
    pub fn delays(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(Some(self.first_delay()), |&d| Some(self.next_delay(d)))
    }

    /// Upper bound on time spent sleeping before the poller gives up.
    /// The final attempt is not followed by a delay.
    pub fn worst_case_wait(&self) -> Duration {
        let sleeps = u64::from(self.max_attempts.saturating_sub(1));
        let mut total: u64 = 0;
        let mut taken: u64 = 0;
        let mut delay = self.first_delay();

        while taken < sleeps {
            let next = self.next_delay(delay);
            if next == delay {
                // the sequence is flat from here on (capped or stalled)
                total = total.saturating_add(delay.saturating_mul(sleeps - taken));
                break;
            }
            total = total.saturating_add(delay);
            taken += 1;
            delay = next;
        }
        Duration::from_millis(total)
    }
}
