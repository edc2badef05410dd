//! Gauge controller
//!
//! One controller owns one transport. Reads take the transport lock, then
//! snapshot the active configuration, so a `configure` or `select_gauge`
//! issued mid-read only affects the next read. Failures are returned as
//! [`Fault`] values; the last good reading is kept for diagnostics but never
//! handed out in place of a failed one.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use vacuum_gauge_core::{
    CrossoverState, Fault, FrameCodec, GaugeProfile, GaugeResult, JitterSource, PressureUnit,
    Reading, ReadingPipeline, ReadingSettings, RetryPolicy, TransportError,
};

use crate::config::{ConfigError, ControllerConfig};
use crate::retry::{RandJitter, RetryExecutor};
use crate::transport::AsyncTransport;

/// Partial reconfiguration; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    /// Output unit
    pub unit: Option<PressureUnit>,
    /// Gas correction factor
    pub gas_correction: Option<f64>,
    /// Retry and timeout policy
    pub retry_policy: Option<RetryPolicy>,
}

impl ConfigUpdate {
    /// Change only the output unit
    pub fn unit(unit: PressureUnit) -> Self {
        Self {
            unit: Some(unit),
            ..Self::default()
        }
    }

    /// Change only the gas correction factor
    pub fn gas_correction(factor: f64) -> Self {
        Self {
            gas_correction: Some(factor),
            ..Self::default()
        }
    }

    /// Change only the retry policy
    pub fn retry_policy(policy: RetryPolicy) -> Self {
        Self {
            retry_policy: Some(policy),
            ..Self::default()
        }
    }
}

/// Configuration in force; cloned once per read
#[derive(Debug, Clone)]
struct Active {
    settings: ReadingSettings,
    retry: RetryPolicy,
    /// Bumped by `select_gauge`
    profile_generation: u64,
}

/// State guarded by the transport lock
struct Channel<T> {
    transport: T,
    crossover: CrossoverState,
    profile_generation: u64,
    jitter: Box<dyn JitterSource + Send>,
}

/// Async front end for one gauge
pub struct GaugeController<T> {
    channel: tokio::sync::Mutex<Channel<T>>,
    active: RwLock<Active>,
    codec: Option<Arc<dyn FrameCodec>>,
    last_reading: Mutex<Option<Reading>>,
}

impl<T: AsyncTransport> GaugeController<T> {
    /// Controller configured from a loaded [`ControllerConfig`]
    pub fn new(transport: T, config: &ControllerConfig) -> Result<Self, ConfigError> {
        let (settings, retry) = config.resolve()?;
        Ok(Self::from_parts(transport, settings, retry))
    }

    /// Controller with explicit settings
    pub fn with_settings(
        transport: T,
        settings: ReadingSettings,
        retry: RetryPolicy,
    ) -> GaugeResult<Self> {
        settings.validate()?;
        retry.validate()?;
        Ok(Self::from_parts(transport, settings, retry))
    }

    fn from_parts(transport: T, settings: ReadingSettings, retry: RetryPolicy) -> Self {
        Self {
            channel: tokio::sync::Mutex::new(Channel {
                transport,
                crossover: CrossoverState::default(),
                profile_generation: 0,
                jitter: Box::new(RandJitter::from_entropy()),
            }),
            active: RwLock::new(Active {
                settings,
                retry,
                profile_generation: 0,
            }),
            codec: None,
            last_reading: Mutex::new(None),
        }
    }

    /// Decode serial frames with `codec`
    pub fn with_codec(mut self, codec: impl FrameCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Replace the jitter source (tests use `NoJitter`)
    pub fn with_jitter(mut self, jitter: impl JitterSource + Send + 'static) -> Self {
        self.channel.get_mut().jitter = Box::new(jitter);
        self
    }

    /// Validate `update` in full, then apply it atomically
    pub fn configure(&self, update: ConfigUpdate) -> GaugeResult<()> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = active.clone();
        if let Some(unit) = update.unit {
            next.settings.unit = unit;
        }
        if let Some(factor) = update.gas_correction {
            next.settings.gas_correction = factor;
        }
        if let Some(policy) = update.retry_policy {
            next.retry = policy;
        }
        next.settings.validate()?;
        next.retry.validate()?;

        *active = next;
        log::info!(
            "Gauge {} configured: unit {}, gas correction {}",
            active.settings.profile.id(),
            active.settings.unit,
            active.settings.gas_correction
        );
        Ok(())
    }

    /// Switch to another gauge profile
    ///
    /// Keeps the output unit when the new profile supports it, otherwise
    /// falls back to the profile's default. Combination hysteresis restarts
    /// on the next read.
    pub fn select_gauge(&self, profile: impl Into<Arc<GaugeProfile>>) -> GaugeResult<()> {
        let profile = profile.into();
        profile.validate().map_err(Fault::from)?;

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let unit = if profile.supports(active.settings.unit) {
            active.settings.unit
        } else {
            log::info!(
                "Unit {} not supported by {}, using {}",
                active.settings.unit,
                profile.id(),
                profile.default_unit()
            );
            profile.default_unit()
        };
        let settings = ReadingSettings::new(profile, unit, active.settings.gas_correction);
        settings.validate()?;

        active.settings = settings;
        active.profile_generation += 1;
        log::info!("Selected gauge {}", active.settings.profile.id());
        Ok(())
    }

    /// Take one reading
    pub async fn read(&self) -> GaugeResult<Reading> {
        self.read_inner(None).await
    }

    /// Take one reading, giving up with `Cancelled` once `cancel` fires
    ///
    /// A transport call already issued runs to completion; cancellation
    /// stops the wait for the transport and any further attempt.
    pub async fn read_cancellable(&self, cancel: &CancellationToken) -> GaugeResult<Reading> {
        self.read_inner(Some(cancel)).await
    }

    /// Most recent successful reading
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Profile in force
    pub fn profile(&self) -> Arc<GaugeProfile> {
        Arc::clone(&self.snapshot().settings.profile)
    }

    /// Output unit in force
    pub fn unit(&self) -> PressureUnit {
        self.snapshot().settings.unit
    }

    /// Gas correction factor in force
    pub fn gas_correction(&self) -> f64 {
        self.snapshot().settings.gas_correction
    }

    /// Retry policy in force
    pub fn retry_policy(&self) -> RetryPolicy {
        self.snapshot().retry
    }

    /// Run `f` with exclusive access to the transport
    pub async fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.channel.lock().await.transport)
    }

    fn snapshot(&self) -> Active {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn read_inner(&self, cancel: Option<&CancellationToken>) -> GaugeResult<Reading> {
        let mut channel = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::warn!("Read cancelled while waiting for the transport");
                    return Err(Fault::cancelled(0));
                }
                guard = self.channel.lock() => guard,
            },
            None => self.channel.lock().await,
        };

        let active = self.snapshot();
        if channel.profile_generation != active.profile_generation {
            channel.crossover.reset();
            channel.profile_generation = active.profile_generation;
        }

        let Channel {
            transport,
            crossover,
            jitter,
            ..
        } = &mut *channel;
        let codec = self.codec.as_deref();
        let mut retry = RetryExecutor::new(active.retry, &mut **jitter, cancel);

        let result = loop {
            retry.begin()?;
            let outcome = attempt(
                &active.settings,
                codec,
                crossover,
                transport,
                active.retry.attempt_timeout,
            )
            .await;
            if let Some(done) = retry.settle(outcome).await {
                break done;
            }
        };

        match &result {
            Ok(reading) => {
                log::debug!(
                    "Read {} {} from {}",
                    reading.magnitude(),
                    reading.unit(),
                    reading.gauge()
                );
                *self
                    .last_reading
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(reading.clone());
            }
            Err(fault) => log::warn!("Read failed: {}", fault),
        }
        result
    }
}

/// One pipeline run with its own transport timeout
async fn attempt<T: AsyncTransport>(
    settings: &ReadingSettings,
    codec: Option<&dyn FrameCodec>,
    crossover: &mut CrossoverState,
    transport: &mut T,
    budget: Duration,
) -> GaugeResult<Reading> {
    let mut pipeline = ReadingPipeline::new(settings, codec, crossover);
    let request = pipeline.acquisition_request()?;
    let outcome = tokio::time::timeout(budget, transport.acquire(&request))
        .await
        .unwrap_or_else(|_| {
            log::debug!("Acquisition exceeded {:?}", budget);
            Err(TransportError::Timeout)
        });
    pipeline.finish(outcome)
}
