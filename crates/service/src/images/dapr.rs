use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde_json::json;
use tracing::{info, warn};

use super::{BlobLocator, ImageError, ImageResolver};

/// Resolver backed by a Dapr blob-storage output binding.
///
/// Every operation is a `POST {endpoint}/v1.0/bindings/{binding}` carrying
/// `{operation, data?, metadata: {blobName}}`.
pub struct DaprBlobImageResolver {
    client: reqwest::Client,
    bindings_url: String,
    locator: BlobLocator,
}

impl DaprBlobImageResolver {
    pub fn new(endpoint: &str, binding: &str, locator: BlobLocator, timeout: Duration) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Unavailable(e.to_string()))?;
        let bindings_url = format!("{}/v1.0/bindings/{}", endpoint.trim_end_matches('/'), binding);
        Ok(Self { client, bindings_url, locator })
    }

    pub fn from_config(cfg: &configs::ImageStoreConfig) -> Result<Self, ImageError> {
        Self::new(
            &cfg.dapr_http_endpoint,
            &cfg.binding,
            BlobLocator::from_config(cfg),
            Duration::from_millis(cfg.timeout_ms),
        )
    }

    async fn invoke(&self, operation: &'static str, blob_name: &str, data: Option<String>) -> Result<StatusCode, ImageError> {
        let mut body = json!({
            "operation": operation,
            "metadata": { "blobName": blob_name },
        });
        if let Some(data) = data {
            body["data"] = serde_json::Value::String(data);
        }
        let resp = self
            .client
            .post(&self.bindings_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageError::Unavailable(e.to_string()))?;
        Ok(resp.status())
    }
}

#[async_trait]
impl ImageResolver for DaprBlobImageResolver {
    fn backend_name(&self) -> &'static str { "dapr" }

    async fn resolve_url(&self, name: &str) -> Result<Option<String>, ImageError> {
        let blob = self.locator.blob_name(name);
        let status = self.invoke("get", &blob, None).await?;
        if !status.is_success() {
            // 图片不存在时返回占位 URL（与存在时相同的确定性地址）
            warn!(character = %name, %blob, status = status.as_u16(), "image not found, returning placeholder url");
        }
        Ok(Some(self.locator.url_for(name)))
    }

    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        let blob = self.locator.blob_name(name);
        info!(character = %name, %blob, size = bytes.len(), "uploading character image");
        let status = self.invoke("create", &blob, Some(STANDARD.encode(&bytes))).await?;
        if !status.is_success() {
            return Err(ImageError::Rejected { operation: "create", status: status.as_u16() });
        }
        Ok(self.locator.url_for(name))
    }

    async fn delete(&self, name: &str) -> Result<bool, ImageError> {
        let blob = self.locator.blob_name(name);
        let status = self.invoke("delete", &blob, None).await?;
        if !status.is_success() {
            warn!(character = %name, %blob, status = status.as_u16(), "image delete rejected");
            return Ok(false);
        }
        Ok(true)
    }
}
