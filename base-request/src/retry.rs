use std::{cmp, time::Duration};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

/// How many times a request is re-issued while its status is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Re-issue the request immediately, forever, until an accepted status arrives.
    ///
    /// This never returns against a server that keeps answering with other statuses.
    Unbounded,
    /// Give up after `max_attempts` requests, sleeping between attempts with a doubling
    /// backoff capped at `max_backoff`.
    Bounded {
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
    },
}

impl RetryPolicy {
    /// A bounded policy with the default backoff bounds.
    pub fn attempts(max_attempts: u32) -> Self {
        RetryPolicy::Bounded {
            max_attempts,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    /// A bounded policy that retries without sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        RetryPolicy::Bounded {
            max_attempts,
            initial_backoff: Duration::from_millis(0),
            max_backoff: Duration::from_millis(0),
        }
    }

    /// Parses `unbounded` or a positive attempt count.
    pub fn parse<S: AsRef<str>>(value: S) -> Option<Self> {
        let value = value.as_ref().trim();

        if value.eq_ignore_ascii_case("unbounded") {
            return Some(RetryPolicy::Unbounded);
        }

        match value.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(attempts) => Some(Self::attempts(attempts)),
        }
    }

    /// Whether another attempt is allowed after `attempts` requests have been made.
    pub fn allows_another(&self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Bounded { max_attempts, .. } => attempts < *max_attempts,
        }
    }

    /// The pause before the attempt that follows attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::Unbounded => Duration::from_millis(0),
            RetryPolicy::Bounded {
                initial_backoff,
                max_backoff,
                ..
            } => {
                let factor = 1u32
                    .checked_shl(attempt.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                let delay = initial_backoff
                    .checked_mul(factor)
                    .unwrap_or(*max_backoff);

                cmp::min(delay, *max_backoff)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::attempts(DEFAULT_MAX_ATTEMPTS)
    }
}
