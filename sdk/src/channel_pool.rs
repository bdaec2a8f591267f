//! Pool of reusable transport channels to the control plane.
//!
//! Channels are created lazily by a [`ChannelFactory`], handed out
//! exclusively through a [`ChannelGuard`], and returned to the free list when
//! the guard goes out of scope, unless the factory reports them as unusable.

use crate::error::{Result, SdkError};
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

/// Creates channels and tells whether a channel can still be used
pub trait ChannelFactory: Send + Sync {
    type Channel: Send;

    fn create(&self) -> Result<Self::Channel>;

    fn is_usable(&self, channel: &Self::Channel) -> bool;
}

/// Free list of channels produced by a [`ChannelFactory`]
pub struct ChannelPool<F: ChannelFactory> {
    factory: F,
    free: Mutex<Vec<F::Channel>>,
}

impl<F: ChannelFactory> ChannelPool<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            free: Mutex::new(Vec::new()),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Take a usable channel from the pool, creating one if none is free.
    pub fn acquire(&self) -> Result<ChannelGuard<'_, F>> {
        let channel = loop {
            let candidate = self.free.lock().pop();
            match candidate {
                Some(channel) if self.factory.is_usable(&channel) => break channel,
                Some(_) => debug!("Discarding unusable pooled channel"),
                None => {
                    debug!("Creating a new channel");
                    break self.factory.create()?;
                }
            }
        };
        Ok(ChannelGuard {
            pool: self,
            channel: Some(channel),
        })
    }

    /// Give a channel back to the pool. Unusable channels are dropped.
    pub fn release(&self, channel: F::Channel) {
        if self.factory.is_usable(&channel) {
            self.free.lock().push(channel);
        } else {
            debug!("Dropping failed channel instead of pooling it");
        }
    }

    /// Run `f` with a pooled channel, returning the channel afterwards even
    /// if `f` panics.
    pub fn with_channel<R>(&self, f: impl FnOnce(&mut F::Channel) -> R) -> Result<R> {
        let mut guard = self.acquire()?;
        Ok(f(&mut guard))
    }

    /// Number of channels waiting in the free list
    pub fn idle_count(&self) -> usize {
        self.free.lock().len()
    }
}

/// Exclusive checkout of a pooled channel, released on drop
pub struct ChannelGuard<'a, F: ChannelFactory> {
    pool: &'a ChannelPool<F>,
    channel: Option<F::Channel>,
}

impl<F: ChannelFactory> Deref for ChannelGuard<'_, F> {
    type Target = F::Channel;

    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the channel out.
        match &self.channel {
            Some(channel) => channel,
            None => unreachable!("channel guard used after release"),
        }
    }
}

impl<F: ChannelFactory> DerefMut for ChannelGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.channel {
            Some(channel) => channel,
            None => unreachable!("channel guard used after release"),
        }
    }
}

impl<F: ChannelFactory> Drop for ChannelGuard<'_, F> {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            self.pool.release(channel);
        }
    }
}

/// A tonic channel that remembers transport failures seen on it
#[derive(Debug)]
pub struct GrpcChannel {
    channel: Channel,
    failed: AtomicBool,
}

impl GrpcChannel {
    /// Clone of the underlying channel, for building service clients
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Flag the channel so it is not returned to the pool
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

/// Creates lazily-connected channels to one endpoint
pub struct GrpcChannelFactory {
    endpoint: String,
    runtime: Handle,
}

impl GrpcChannelFactory {
    /// `endpoint` defaults to the `http` scheme when it has none.
    ///
    /// Channels spawn their connection task on `runtime`.
    pub fn new(endpoint: &str, runtime: Handle) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint);
        Endpoint::from_shared(endpoint.clone()).map_err(|e| {
            SdkError::InvalidConfiguration(format!("invalid endpoint {endpoint:?}: {e}"))
        })?;
        Ok(Self { endpoint, runtime })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChannelFactory for GrpcChannelFactory {
    type Channel = GrpcChannel;

    fn create(&self) -> Result<GrpcChannel> {
        let endpoint = Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        let _context = self.runtime.enter();
        Ok(GrpcChannel {
            channel: endpoint.connect_lazy(),
            failed: AtomicBool::new(false),
        })
    }

    fn is_usable(&self, channel: &GrpcChannel) -> bool {
        !channel.is_failed()
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}
