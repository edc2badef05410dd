//! Async transport adapters
//!
//! The controller awaits one [`AsyncTransport::acquire`] per attempt. Native
//! async drivers implement the trait directly; synchronous transports from
//! the core crate are wrapped in [`Blocking`], which runs each call on
//! tokio's blocking pool so a slow serial read never stalls the scheduler.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vacuum_gauge_core::{AcquisitionRequest, RawSample, Transport, TransportError};

/// Asynchronous acquisition of one raw sample
#[async_trait]
pub trait AsyncTransport: Send {
    /// Serve one request
    async fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError>;
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for Box<T> {
    async fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        (**self).acquire(request).await
    }
}

/// [`AsyncTransport`] running a blocking [`Transport`] on the blocking pool
///
/// A call abandoned by its timeout keeps running on the pool; the next call
/// waits for it to release the transport before issuing its own request.
pub struct Blocking<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Blocking<T> {
    /// Wrap a synchronous transport
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// Run `f` against the wrapped transport
    ///
    /// Blocks while a call is in flight on the pool.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, TransportError> {
        let mut guard = self.inner.lock().map_err(|_| TransportError::Unavailable)?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl<T: Transport + Send + 'static> AsyncTransport for Blocking<T> {
    async fn acquire(&mut self, request: &AcquisitionRequest) -> Result<RawSample, TransportError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            let mut transport = inner.lock().map_err(|_| TransportError::Unavailable)?;
            transport.acquire(&request)
        })
        .await
        .map_err(|err| {
            log::error!("Blocking transport task failed: {}", err);
            TransportError::Unavailable
        })?
    }
}
