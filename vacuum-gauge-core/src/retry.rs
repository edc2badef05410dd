//! Retry policy and decision logic
//!
//! Only faults that a second attempt could plausibly change are retried:
//! [`FaultKind::CommunicationError`](crate::FaultKind::CommunicationError)
//! and [`FaultKind::Transient`](crate::FaultKind::Transient). Decode and
//! validation outcomes are deterministic, so retrying them would only repeat
//! the same answer more slowly.
//!
//! ```text
//! attempt 1 ──fail──► wait base ± jitter
//! attempt 2 ──fail──► wait base·m ± jitter
//! attempt 3 ──fail──► wait base·m² ± jitter
//! ...
//! attempt N ──fail──► return last fault, attempts = N
//! ```
//!
//! [`RetryState`] holds the bookkeeping and never sleeps, so the same logic
//! drives [`execute_blocking`] here and the async executor of the controller.

use core::time::Duration;

use crate::constants::timing::*;
use crate::errors::{Fault, GaugeResult};

/// Bounded exponential backoff with jitter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryPolicy {
    /// Transport attempts per read, first try included (≥ 1)
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    #[cfg_attr(feature = "serde", serde(rename = "base_backoff_ms", with = "millis"))]
    pub base_backoff: Duration,
    /// Growth of the delay per attempt (≥ 1)
    pub multiplier: f64,
    /// Bound of the uniform jitter added to each delay
    #[cfg_attr(feature = "serde", serde(rename = "jitter_ms", with = "millis"))]
    pub jitter: Duration,
    /// Budget of each individual transport acquisition
    ///
    /// The same for every attempt; it does not grow with the backoff schedule.
    #[cfg_attr(feature = "serde", serde(rename = "attempt_timeout_ms", with = "millis"))]
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(DEFAULT_BASE_BACKOFF_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: Duration::from_millis(DEFAULT_JITTER_MS),
            attempt_timeout: Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS),
        }
    }
}

impl RetryPolicy {
    /// Policy without jitter
    pub fn new(max_attempts: u32, base_backoff: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_backoff,
            multiplier,
            jitter: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Single attempt, never retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Set the jitter bound
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the per-attempt timeout
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Reject policies that could never attempt or would grow unboundedly
    pub fn validate(&self) -> GaugeResult<()> {
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(
                Fault::invalid_configuration("max attempts out of range")
                    .with_value(self.max_attempts as f64),
            );
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(
                Fault::invalid_configuration("backoff multiplier must be at least 1")
                    .with_value(self.multiplier),
            );
        }
        if self.attempt_timeout.is_zero() {
            return Err(Fault::invalid_configuration(
                "attempt timeout must be positive",
            ));
        }
        Ok(())
    }

    /// Delay after failed attempt `attempt` (1-indexed)
    ///
    /// `jitter_unit` in `[-1, 1]` scales the jitter bound; the result is
    /// clamped to zero.
    pub fn backoff(&self, attempt: u32, jitter_unit: f64) -> Duration {
        let exponent = attempt.saturating_sub(1) as f64;
        let base_us = self.base_backoff.as_micros() as f64;
        let jitter_us = self.jitter.as_micros() as f64;
        let unit = if jitter_unit.is_nan() {
            0.0
        } else {
            jitter_unit.clamp(-1.0, 1.0)
        };

        let delay_us = base_us * libm::pow(self.multiplier, exponent) + unit * jitter_us;
        // Float-to-int casts saturate, so negative and oversized delays stay finite
        Duration::from_micros(libm::round(delay_us) as u64)
    }
}

/// Uniform samples in `[-1, 1]` used to spread retries
pub trait JitterSource {
    /// Next sample
    fn next_unit(&mut self) -> f64;
}

/// Jitter source that always returns 0
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_unit(&mut self) -> f64 {
        0.0
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryStep {
    /// Wait, then attempt again
    Retry {
        /// Backoff before the next attempt
        delay: Duration,
    },
    /// Stop and return this fault
    GiveUp(Fault),
}

/// Attempt bookkeeping for one read
#[derive(Debug, Clone, Copy)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    /// Fresh state for `policy`
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Count a new attempt and return its 1-indexed number
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Policy in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Decide how to continue after `fault`
    pub fn on_failure(&mut self, fault: Fault, jitter: &mut dyn JitterSource) -> RetryStep {
        let fault = fault.with_attempts(self.attempts);
        if !fault.is_retryable() {
            return RetryStep::GiveUp(fault);
        }
        if self.attempts >= self.policy.max_attempts {
            log_warn!(
                "Giving up after {} attempts: {}",
                self.attempts,
                fault.detail
            );
            return RetryStep::GiveUp(fault);
        }
        let delay = self.policy.backoff(self.attempts, jitter.next_unit());
        log_debug!(
            "Attempt {} failed ({}), retrying in {:?}",
            self.attempts,
            fault.kind,
            delay
        );
        RetryStep::Retry { delay }
    }
}

/// Run `attempt` under `policy`, sleeping with `sleep` between attempts
///
/// `attempt` receives the 1-indexed attempt number. The per-attempt timeout
/// is left to the transport; blocking calls cannot be interrupted from here.
pub fn execute_blocking<T, F, S>(
    policy: &RetryPolicy,
    jitter: &mut dyn JitterSource,
    mut sleep: S,
    mut attempt: F,
) -> GaugeResult<T>
where
    F: FnMut(u32) -> GaugeResult<T>,
    S: FnMut(Duration),
{
    let mut state = RetryState::new(*policy);
    loop {
        let n = state.begin_attempt();
        match attempt(n) {
            Ok(value) => return Ok(value),
            Err(fault) => match state.on_failure(fault, jitter) {
                RetryStep::Retry { delay } => sleep(delay),
                RetryStep::GiveUp(fault) => return Err(fault),
            },
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
