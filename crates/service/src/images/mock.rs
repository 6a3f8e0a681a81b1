//! Test doubles for the resolver seam, usable from any crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{BlobLocator, ImageError, ImageResolver, InMemoryImageResolver};

/// Every call fails as if the backend were down.
#[derive(Default)]
pub struct FailingImageResolver;

#[async_trait]
impl ImageResolver for FailingImageResolver {
    fn backend_name(&self) -> &'static str { "failing" }

    async fn resolve_url(&self, _name: &str) -> Result<Option<String>, ImageError> {
        Err(ImageError::Unavailable("connection refused".into()))
    }

    async fn upload(&self, _name: &str, _bytes: Vec<u8>) -> Result<String, ImageError> {
        Err(ImageError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _name: &str) -> Result<bool, ImageError> {
        Err(ImageError::Unavailable("connection refused".into()))
    }
}

/// Sleeps before answering, for exercising timeouts.
pub struct StallingImageResolver {
    pub delay: Duration,
    locator: BlobLocator,
}

impl StallingImageResolver {
    pub fn new(delay: Duration) -> Self {
        Self { delay, locator: BlobLocator::default() }
    }
}

#[async_trait]
impl ImageResolver for StallingImageResolver {
    fn backend_name(&self) -> &'static str { "stalling" }

    async fn resolve_url(&self, name: &str) -> Result<Option<String>, ImageError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.locator.url_for(name)))
    }

    async fn upload(&self, name: &str, _bytes: Vec<u8>) -> Result<String, ImageError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.locator.url_for(name))
    }

    async fn delete(&self, _name: &str) -> Result<bool, ImageError> {
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

/// In-memory resolver that also counts calls and remembers deleted names.
#[derive(Default)]
pub struct RecordingImageResolver {
    inner: InMemoryImageResolver,
    resolves: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl RecordingImageResolver {
    pub fn resolve_calls(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn inner(&self) -> &InMemoryImageResolver {
        &self.inner
    }
}

#[async_trait]
impl ImageResolver for RecordingImageResolver {
    fn backend_name(&self) -> &'static str { "recording" }

    async fn resolve_url(&self, name: &str) -> Result<Option<String>, ImageError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_url(name).await
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        self.inner.upload(name, bytes).await
    }

    async fn delete(&self, name: &str) -> Result<bool, ImageError> {
        if let Ok(mut d) = self.deleted.lock() {
            d.push(name.to_string());
        }
        self.inner.delete(name).await
    }
}
