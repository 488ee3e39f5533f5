use std::time::Duration;

/// Retry classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or read timed out.
    Timeout,
    /// Connection refused, reset, DNS failure.
    Connection,
    /// Remote asked us to slow down (429, 503).
    Throttled,
    /// Any other 5xx.
    ServerError(u16),
    /// Not worth retrying (4xx, bad content, local IO).
    Permanent,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 | 503 => FailureKind::Throttled,
            500..=599 => FailureKind::ServerError(status),
            _ => FailureKind::Permanent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Exponential backoff with a cap on both attempts and delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// `attempt` is 1-based (1 = the attempt that just failed).
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            FailureKind::Permanent => RetryDecision::NoRetry,
            FailureKind::Timeout
            | FailureKind::Connection
            | FailureKind::Throttled
            | FailureKind::ServerError(_) => {
                let factor = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}
