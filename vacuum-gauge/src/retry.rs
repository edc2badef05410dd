//! Async retry executor
//!
//! Wraps the core [`RetryState`] with tokio timers. Backoff sleeps race a
//! [`CancellationToken`]: cancelling never interrupts a transport call that
//! is already in flight, it only stops the next attempt from starting.

use std::future::Future;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use vacuum_gauge_core::{Fault, GaugeResult, JitterSource, RetryPolicy, RetryState, RetryStep};

/// Uniform jitter from a seeded [`StdRng`]
#[derive(Debug, Clone)]
pub struct RandJitter {
    rng: StdRng,
}

impl RandJitter {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandJitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl JitterSource for RandJitter {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// Step-wise retry loop for callers whose attempts borrow local state
///
/// ```ignore
/// let mut retry = RetryExecutor::new(policy, &mut jitter, Some(&token));
/// let result = loop {
///     let attempt = retry.begin()?;
///     if let Some(done) = retry.settle(try_once(attempt).await).await {
///         break done;
///     }
/// };
/// ```
pub struct RetryExecutor<'a> {
    state: RetryState,
    jitter: &'a mut (dyn JitterSource + Send),
    cancel: Option<&'a CancellationToken>,
}

impl<'a> RetryExecutor<'a> {
    /// Executor for one read
    pub fn new(
        policy: RetryPolicy,
        jitter: &'a mut (dyn JitterSource + Send),
        cancel: Option<&'a CancellationToken>,
    ) -> Self {
        Self {
            state: RetryState::new(policy),
            jitter,
            cancel,
        }
    }

    /// Start the next attempt, or fail with `Cancelled`
    pub fn begin(&mut self) -> GaugeResult<u32> {
        if self.is_cancelled() {
            log::warn!("Read cancelled after {} attempts", self.state.attempts());
            return Err(Fault::cancelled(self.state.attempts()));
        }
        Ok(self.state.begin_attempt())
    }

    /// Record the outcome of the current attempt
    ///
    /// Returns the final result, or `None` once the backoff delay has
    /// elapsed and another attempt should begin.
    pub async fn settle<T>(&mut self, outcome: GaugeResult<T>) -> Option<GaugeResult<T>> {
        let fault = match outcome {
            Ok(value) => return Some(Ok(value)),
            Err(fault) => fault,
        };
        let delay = match self.state.on_failure(fault, &mut *self.jitter) {
            RetryStep::GiveUp(fault) => return Some(Err(fault)),
            RetryStep::Retry { delay } => delay,
        };
        match self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        log::warn!(
                            "Read cancelled during backoff after {} attempts",
                            self.state.attempts()
                        );
                        Some(Err(Fault::cancelled(self.state.attempts())))
                    }
                    _ = tokio::time::sleep(delay) => None,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                None
            }
        }
    }

    /// Attempts started so far
    pub fn attempts(&self) -> u32 {
        self.state.attempts()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }
}

/// Run `attempt` under `policy` until it succeeds, gives up or is cancelled
pub async fn execute<T, F, Fut>(
    policy: RetryPolicy,
    jitter: &mut (dyn JitterSource + Send),
    cancel: Option<&CancellationToken>,
    mut attempt: F,
) -> GaugeResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = GaugeResult<T>>,
{
    let mut retry = RetryExecutor::new(policy, jitter, cancel);
    loop {
        let n = retry.begin()?;
        if let Some(result) = retry.settle(attempt(n).await).await {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use vacuum_gauge_core::{FaultKind, NoJitter};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(50), 2.0)
    }

    fn timeout_fault() -> Fault {
        Fault::new(FaultKind::Transient, "transport timeout")
    }

    #[test]
    fn rand_jitter_stays_in_unit_range() {
        let mut jitter = RandJitter::seeded(7);
        for _ in 0..1000 {
            let unit = jitter.next_unit();
            assert!((-1.0..=1.0).contains(&unit));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let started = tokio::time::Instant::now();

        let result = execute(policy(3), &mut NoJitter, None, |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(timeout_fault())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 50 ms after the first failure, 100 ms after the second
        assert!(started.elapsed() >= Duration::from_millis(150));
        assert!(started.elapsed() < Duration::from_millis(160));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: GaugeResult<()> = execute(policy(5), &mut NoJitter, None, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(Fault::out_of_range("signal outside transfer function domain", 12.0)) }
        })
        .await;

        let fault = result.unwrap_err();
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        assert_eq!(fault.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff() {
        let token = CancellationToken::new();
        let trigger = token.clone();

        let result: GaugeResult<()> = execute(policy(5), &mut NoJitter, Some(&token), |_| {
            trigger.cancel();
            async { Err(timeout_fault()) }
        })
        .await;

        let fault = result.unwrap_err();
        assert_eq!(fault.kind, FaultKind::Cancelled);
        assert_eq!(fault.attempts, 1);
    }

    #[tokio::test]
    async fn cancelled_before_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();

        let result: GaugeResult<()> =
            execute(policy(3), &mut NoJitter, Some(&token), |_| async { Ok(()) }).await;

        assert_eq!(result.unwrap_err().kind, FaultKind::Cancelled);
    }
}
