//! Image resolver abstraction.
//!
//! A resolver maps a character name to the location of its display image and
//! can upload or remove that image. Locations are deterministic: the name is
//! lowercased and stripped of spaces, then used as both folder and file stem.

use async_trait::async_trait;
use thiserror::Error;

pub mod dapr;
pub mod memory;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use dapr::DaprBlobImageResolver;
pub use memory::InMemoryImageResolver;

#[derive(Debug, Error)]
pub enum ImageError {
    /// Backend unreachable or too slow.
    #[error("image backend unavailable: {0}")]
    Unavailable(String),
    /// Backend answered but refused the operation.
    #[error("image backend rejected {operation}: status {status}")]
    Rejected { operation: &'static str, status: u16 },
}

#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Short label reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
    /// Best-effort URL for the character's image.
    async fn resolve_url(&self, name: &str) -> Result<Option<String>, ImageError>;
    /// Persist the image bytes and return the URL they are served from.
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, ImageError>;
    /// Remove the stored image; `Ok(false)` when the backend did not delete anything.
    async fn delete(&self, name: &str) -> Result<bool, ImageError>;
}

/// Lowercase the name and drop spaces: `"Super Vegeta"` → `"supervegeta"`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().chars().filter(|c| *c != ' ').collect()
}

/// Builds blob names and public URLs for a storage account/container pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobLocator {
    pub storage_account: String,
    pub container: String,
}

impl BlobLocator {
    pub fn new(storage_account: &str, container: &str) -> Self {
        Self { storage_account: storage_account.to_string(), container: container.to_string() }
    }

    pub fn from_config(cfg: &configs::ImageStoreConfig) -> Self {
        Self::new(&cfg.storage_account, &cfg.container)
    }

    /// `<norm>/<norm>.jpg`
    pub fn blob_name(&self, name: &str) -> String {
        let n = normalize_name(name);
        format!("{n}/{n}.jpg")
    }

    pub fn url_for(&self, name: &str) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.storage_account,
            self.container,
            self.blob_name(name)
        )
    }
}

impl Default for BlobLocator {
    fn default() -> Self {
        Self::new("dragonballstorage", "characters")
    }
}
