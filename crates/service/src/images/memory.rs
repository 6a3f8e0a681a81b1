use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{BlobLocator, ImageError, ImageResolver};

/// Image store kept in process memory, keyed by blob name.
///
/// Resolution always yields the deterministic URL; a missing blob only logs a
/// warning, the same placeholder behaviour as the blob-backed resolver.
#[derive(Default)]
pub struct InMemoryImageResolver {
    locator: BlobLocator,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageResolver {
    pub fn new(locator: BlobLocator) -> Self {
        Self { locator, blobs: RwLock::new(HashMap::new()) }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.blobs.read().await.contains_key(&self.locator.blob_name(name))
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl ImageResolver for InMemoryImageResolver {
    fn backend_name(&self) -> &'static str { "memory" }

    async fn resolve_url(&self, name: &str) -> Result<Option<String>, ImageError> {
        let blob = self.locator.blob_name(name);
        if !self.blobs.read().await.contains_key(&blob) {
            warn!(character = %name, %blob, "image not found, returning placeholder url");
        }
        Ok(Some(self.locator.url_for(name)))
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        let blob = self.locator.blob_name(name);
        debug!(character = %name, %blob, size = bytes.len(), "storing image in memory");
        self.blobs.write().await.insert(blob, bytes);
        Ok(self.locator.url_for(name))
    }

    async fn delete(&self, name: &str) -> Result<bool, ImageError> {
        let blob = self.locator.blob_name(name);
        Ok(self.blobs.write().await.remove(&blob).is_some())
    }
}
