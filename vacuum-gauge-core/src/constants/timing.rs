//! Retry and Timeout Defaults
//!
//! RS485 gauge controllers answer within a few tens of milliseconds; an
//! unanswered query after a quarter second is lost, not slow.

/// Default number of transport attempts per read (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the second attempt (ms).
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 50;

/// Default growth factor of the backoff delay per attempt.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default jitter bound applied to each delay (ms).
pub const DEFAULT_JITTER_MS: u64 = 10;

/// Default timeout of a single transport acquisition (ms).
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 250;

/// Upper bound on configurable attempts, keeps a misconfigured policy from
/// blocking a gauge channel indefinitely.
pub const MAX_ATTEMPTS_LIMIT: u32 = 32;
