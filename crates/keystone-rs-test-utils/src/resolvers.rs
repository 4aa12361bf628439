use async_trait::async_trait;
use keystone_rs_core::{Getter, Resolve, Resolver};
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counts how many times the wrapped resolver runs. Clones share the count.
#[derive(Debug, Clone)]
pub struct CountingResolver {
    inner: Resolver,
    calls: Arc<AtomicUsize>,
}

impl CountingResolver {
    /// Count calls to `inner`.
    pub fn new(inner: Resolver) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Count calls to an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<Value>, Getter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::new(Resolver::from_fn(f))
    }

    /// Resolves to the user value, or `fallback` when absent.
    pub fn fixed(fallback: Value) -> Self {
        Self::from_fn(move |value, _| {
            let fallback = fallback.clone();
            async move { Ok(value.unwrap_or(fallback)) }
        })
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolve for CountingResolver {
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(value, get).await
    }
}

/// Always fails with the configured message.
#[derive(Debug, Clone)]
pub struct FailingResolver {
    message: String,
}

impl FailingResolver {
    /// Fail every call with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Resolve for FailingResolver {
    async fn resolve(&self, _value: Option<Value>, _get: Getter) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!(self.message.clone()))
    }
}

/// Sleeps before delegating, to force resolutions to overlap.
#[derive(Debug, Clone)]
pub struct DelayedResolver {
    delay: Duration,
    inner: Resolver,
}

impl DelayedResolver {
    /// Sleep for `delay`, then run `inner`.
    pub fn new(delay: Duration, inner: Resolver) -> Self {
        Self { delay, inner }
    }
}

#[async_trait]
impl Resolve for DelayedResolver {
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value> {
        tokio::time::sleep(self.delay).await;
        self.inner.resolve(value, get).await
    }
}

/// Shared, ordered log of resolver events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// Snapshot of every event, in order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().iter().position(|entry| entry == event)
    }
}

/// Records `start:<name>` and `end:<name>` around the wrapped resolver.
#[derive(Debug, Clone)]
pub struct RecordingResolver {
    name: String,
    inner: Resolver,
    log: EventLog,
}

impl RecordingResolver {
    /// Record `inner`'s calls under `name` into `log`.
    pub fn new(name: impl Into<String>, inner: Resolver, log: EventLog) -> Self {
        Self {
            name: name.into(),
            inner,
            log,
        }
    }
}

#[async_trait]
impl Resolve for RecordingResolver {
    async fn resolve(&self, value: Option<Value>, get: Getter) -> anyhow::Result<Value> {
        self.log.record(format!("start:{}", self.name));
        let result = self.inner.resolve(value, get).await;
        self.log.record(format!("end:{}", self.name));
        result
    }
}
