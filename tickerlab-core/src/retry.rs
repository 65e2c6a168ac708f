//! Retry with exponential backoff.
//!
//! Attempt `n` (zero based) waits `base_delay * 2^(n-1)` before running, so the
//! first attempt is immediate and each retry doubles the pause.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Never less than 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Pause before the given attempt (zero for the first).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt - 1))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or attempts run out.
///
/// `op` receives the zero-based attempt index. The last error is returned.
pub fn retry_with_backoff<T, E, P, F>(policy: &RetryPolicy, is_retryable: P, op: F) -> Result<T, E>
where
    P: Fn(&E) -> bool,
    F: FnMut(u32) -> Result<T, E>,
{
    retry_with_backoff_using(policy, is_retryable, std::thread::sleep, op)
}

/// Same as [`retry_with_backoff`] with an injectable sleep.
pub fn retry_with_backoff_using<T, E, P, S, F>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut sleep: S,
    mut op: F,
) -> Result<T, E>
where
    P: Fn(&E) -> bool,
    S: FnMut(Duration),
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            sleep(delay);
        }
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt >= attempts || !is_retryable(&e) {
                    return Err(e);
                }
                tracing::warn!(attempt, max = attempts, "retryable failure, backing off");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double() {
        let p = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(p.delay_before(0), Duration::ZERO);
        assert_eq!(p.delay_before(1), Duration::from_millis(100));
        assert_eq!(p.delay_before(2), Duration::from_millis(200));
        assert_eq!(p.delay_before(3), Duration::from_millis(400));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let p = RetryPolicy::new(3, Duration::from_millis(10));
        let mut slept = Vec::new();
        let result: Result<u32, &str> = retry_with_backoff_using(
            &p,
            |_| true,
            |d| slept.push(d),
            |attempt| if attempt < 2 { Err("flaky") } else { Ok(attempt) },
        );
        assert_eq!(result, Ok(2));
        assert_eq!(slept, vec![Duration::from_millis(10), Duration::from_millis(20)]);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let p = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), String> = retry_with_backoff_using(
            &p,
            |_| true,
            |_| {},
            |attempt| {
                calls += 1;
                Err(format!("fail {attempt}"))
            },
        );
        assert_eq!(calls, 3);
        assert_eq!(result, Err("fail 2".to_string()));
    }

    #[test]
    fn non_retryable_stops_immediately() {
        let p = RetryPolicy::new(5, Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), &str> = retry_with_backoff_using(
            &p,
            |e| *e != "fatal",
            |_| {},
            |_| {
                calls += 1;
                Err("fatal")
            },
        );
        assert_eq!(calls, 1);
        assert!(result.is_err());
    }
}
