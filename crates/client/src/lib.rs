//! Thin HTTP client for the character catalog API, used by frontends and tests.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

pub use types::{Character, CharacterInput};

pub mod types {
    use serde::{Deserialize, Serialize};

    /// A character as returned by the API.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Character {
        pub id: i32,
        pub name: String,
        pub race: String,
        pub planet: String,
        pub transformation: String,
        pub technique: String,
        pub image_url: Option<String>,
    }

    /// Request body for create and update.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CharacterInput {
        pub name: String,
        pub race: String,
        pub planet: String,
        pub transformation: String,
        pub technique: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub image_url: Option<String>,
    }

    impl CharacterInput {
        pub fn new(name: &str, race: &str, planet: &str, transformation: &str, technique: &str) -> Self {
            Self {
                name: name.to_string(),
                race: race.to_string(),
                planet: planet.to_string(),
                transformation: transformation.to_string(),
                technique: technique.to_string(),
                image_url: None,
            }
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:5304";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("character {0} not found")]
    NotFound(i32),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone, Debug)]
pub struct CharacterClient {
    base_url: String,
    http: reqwest::Client,
}

impl CharacterClient {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http: reqwest::Client::new() }
    }

    /// Base URL from `CATALOG_API_URL`, defaulting to the local dev port.
    pub fn from_env() -> Self {
        let url = std::env::var("CATALOG_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&url)
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self) -> Result<Vec<Character>, ClientError> {
        let resp = self.http.get(self.url("/api/characters")).send().await.map_err(network)?;
        read_json(resp, None).await
    }

    pub async fn get(&self, id: i32) -> Result<Character, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/characters/{id}")))
            .send()
            .await
            .map_err(network)?;
        read_json(resp, Some(id)).await
    }

    pub async fn create(&self, input: &CharacterInput) -> Result<Character, ClientError> {
        let resp = self.http.post(self.url("/api/characters")).json(input).send().await.map_err(network)?;
        read_json(resp, None).await
    }

    pub async fn update(&self, id: i32, input: &CharacterInput) -> Result<Character, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/characters/{id}")))
            .json(input)
            .send()
            .await
            .map_err(network)?;
        read_json(resp, Some(id)).await
    }

    pub async fn delete(&self, id: i32) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/characters/{id}")))
            .send()
            .await
            .map_err(network)?;
        check_status(resp, Some(id)).await.map(|_| ())
    }

    pub async fn upload_image(&self, id: i32, bytes: Vec<u8>) -> Result<Character, ClientError> {
        let resp = self
            .http
            .post(self.url(&format!("/api/characters/{id}/image")))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(network)?;
        read_json(resp, Some(id)).await
    }

    /// Raw value of an application setting; empty when unset.
    pub async fn setting(&self, key: &str) -> Result<String, ClientError> {
        let resp = self.http.get(self.url(&format!("/api/config/{key}"))).send().await.map_err(network)?;
        let v: serde_json::Value = read_json(resp, None).await?;
        Ok(v["value"].as_str().unwrap_or_default().to_string())
    }
}

fn network(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

async fn check_status(resp: reqwest::Response, id: Option<i32>) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    debug!(status = status.as_u16(), url = %resp.url(), "catalog response");
    if status.is_success() {
        return Ok(resp);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(ClientError::NotFound(id));
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status: status.as_u16(), body })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, id: Option<i32>) -> Result<T, ClientError> {
    let resp = check_status(resp, id).await?;
    resp.json::<T>().await.map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let c = CharacterClient::new("http://localhost:5304/");
        assert_eq!(c.url("/api/characters"), "http://localhost:5304/api/characters");
    }

    #[test]
    fn input_omits_absent_image_url() {
        let v = serde_json::to_value(CharacterInput::new("Goku", "Saiyan", "Earth", "Ultra Instinct", "Kamehameha")).unwrap();
        assert_eq!(v["transformation"], "Ultra Instinct");
        assert!(v.get("imageUrl").is_none());
    }

    #[test]
    fn character_reads_camel_case_image_url() {
        let c: Character = serde_json::from_str(
            r#"{"id":3,"name":"Piccolo","race":"Namekian","planet":"Namek","transformation":"Orange Piccolo","technique":"Special Beam Cannon","imageUrl":null}"#,
        )
        .unwrap();
        assert_eq!(c.id, 3);
        assert_eq!(c.image_url, None);
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(ClientError::NotFound(9).to_string(), "character 9 not found");
    }
}
