use std::collections::HashMap;
use std::io;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub image_store: ImageStoreConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Free-form application settings served by `/api/config/{key}`.
    #[serde(default)]
    pub settings: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5304, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Database,
}

impl StorageBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StorageBackend::Memory),
            "database" | "db" => Some(StorageBackend::Database),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Memory, seed_demo_data: true }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageStoreBackend {
    #[default]
    Memory,
    Dapr,
}

impl ImageStoreBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(ImageStoreBackend::Memory),
            "dapr" => Some(ImageStoreBackend::Dapr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageStoreConfig {
    #[serde(default)]
    pub backend: ImageStoreBackend,
    #[serde(default = "default_dapr_endpoint")]
    pub dapr_http_endpoint: String,
    #[serde(default = "default_binding")]
    pub binding: String,
    #[serde(default = "default_storage_account")]
    pub storage_account: String,
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_image_timeout")]
    pub timeout_ms: u64,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            backend: ImageStoreBackend::Memory,
            dapr_http_endpoint: default_dapr_endpoint(),
            binding: default_binding(),
            storage_account: default_storage_account(),
            container: default_container(),
            timeout_ms: default_image_timeout(),
        }
    }
}

fn default_dapr_endpoint() -> String { "http://localhost:3500".into() }
fn default_binding() -> String { "azure-blob-storage".into() }
fn default_storage_account() -> String { "dragonballstorage".into() }
fn default_container() -> String { "characters".into() }
fn default_image_timeout() -> u64 { 3000 }

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: default_origins() }
    }
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".into(), "https://localhost:3001".into()]
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

impl AppConfig {
    /// Config from `CONFIG_PATH` (default `config.toml`), or env-only when that file is absent.
    pub fn load() -> Result<Self> {
        Self::load_or_env(&config_path())
    }

    /// Only a missing file falls back to [`AppConfig::from_env`]; unreadable,
    /// unparsable or invalid files are errors.
    pub fn load_or_env(path: &str) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::from_env(),
            Err(e) => return Err(anyhow!("failed to read config file {path}: {e}")),
        };
        let mut cfg: AppConfig =
            toml::from_str(&content).map_err(|e| anyhow!("failed to parse config file {path}: {e}"))?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Configuration assembled purely from defaults and environment variables,
    /// used when no config file is present.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env(|k| std::env::var(k).ok());
        self.server.normalize()?;
        self.image_store.validate()?;
        if self.storage.backend == StorageBackend::Database {
            self.database.validate()?;
        }
        Ok(())
    }

    /// 环境变量覆盖：仅在变量存在且可解析时生效
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if self.database.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.database.url = url;
            }
        }
        if let Some(b) = lookup("STORAGE_BACKEND").and_then(|v| StorageBackend::parse(&v)) {
            self.storage.backend = b;
        }
        if let Some(b) = lookup("IMAGE_STORE_BACKEND").and_then(|v| ImageStoreBackend::parse(&v)) {
            self.image_store.backend = b;
        }
        if let Some(ep) = lookup("DAPR_HTTP_ENDPOINT") {
            self.image_store.dapr_http_endpoint = ep;
        }
    }

    /// Settings flattened to strings; non-string TOML values keep their literal form.
    pub fn settings_as_strings(&self) -> HashMap<String, String> {
        self.settings
            .iter()
            .map(|(k, v)| {
                let s = match v {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), s)
            })
            .collect()
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://")
            || lower.starts_with("postgres://")
            || lower.starts_with("sqlite:"))
        {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl ImageStoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow!("image_store.timeout_ms must be > 0"));
        }
        if self.storage_account.trim().is_empty() || self.container.trim().is_empty() {
            return Err(anyhow!("image_store.storage_account and container must be set"));
        }
        if self.backend == ImageStoreBackend::Dapr {
            let ep = self.dapr_http_endpoint.to_lowercase();
            if !(ep.starts_with("http://") || ep.starts_with("https://")) {
                return Err(anyhow!("image_store.dapr_http_endpoint must start with http(s)"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 5304);
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert!(cfg.storage.seed_demo_data);
        assert_eq!(cfg.image_store.backend, ImageStoreBackend::Memory);
        assert_eq!(cfg.image_store.storage_account, "dragonballstorage");
        assert_eq!(cfg.image_store.timeout_ms, 3000);
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn parses_full_file() {
        let src = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://u:p@localhost/db"

            [storage]
            backend = "database"
            seed_demo_data = false

            [image_store]
            backend = "dapr"
            binding = "blobs"
            timeout_ms = 1500

            [settings]
            "Features:Upload" = true
            MaxCharacters = 50
            Greeting = "hi"
        "#;
        let mut cfg: AppConfig = toml::from_str(src).unwrap();
        cfg.apply_env(|_| None);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.backend, StorageBackend::Database);
        assert!(!cfg.storage.seed_demo_data);
        assert_eq!(cfg.image_store.backend, ImageStoreBackend::Dapr);
        assert_eq!(cfg.image_store.binding, "blobs");
        assert!(cfg.database.validate().is_ok());

        let settings = cfg.settings_as_strings();
        assert_eq!(settings.get("Features:Upload").map(String::as_str), Some("true"));
        assert_eq!(settings.get("MaxCharacters").map(String::as_str), Some("50"));
        assert_eq!(settings.get("Greeting").map(String::as_str), Some("hi"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| match k {
            "SERVER_PORT" => Some("9000".into()),
            "STORAGE_BACKEND" => Some("Database".into()),
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "IMAGE_STORE_BACKEND" => Some("nonsense".into()),
            _ => None,
        });
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.storage.backend, StorageBackend::Database);
        assert_eq!(cfg.database.url, "sqlite::memory:");
        // unparsable values leave the default in place
        assert_eq!(cfg.image_store.backend, ImageStoreBackend::Memory);
    }

    fn write_temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("catalog-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_env_defaults() {
        let path = std::env::temp_dir().join(format!("catalog-{}-absent.toml", std::process::id()));
        let cfg = AppConfig::load_or_env(path.to_str().unwrap()).unwrap();
        assert!(cfg.storage.seed_demo_data);
        assert_eq!(cfg.image_store.container, "characters");
    }

    #[test]
    fn invalid_database_file_is_an_error_not_a_fallback() {
        let path = write_temp_config(
            "bad-db",
            r#"
                [storage]
                backend = "database"

                [database]
                url = "mysql://prod-db/catalog"
            "#,
        );
        let res = AppConfig::load_or_env(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        let err = res.unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let path = write_temp_config("garbled", "[storage\nbackend = ");
        let res = AppConfig::load_or_env(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(res.unwrap_err().to_string().contains("failed to parse"));
    }

    #[test]
    fn valid_database_file_keeps_database_backend() {
        let path = write_temp_config(
            "good-db",
            r#"
                [storage]
                backend = "database"

                [database]
                url = "sqlite::memory:"
            "#,
        );
        let res = AppConfig::load_or_env(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert_eq!(res.unwrap().storage.backend, StorageBackend::Database);
    }

    #[test]
    fn database_validation_rejects_bad_urls() {
        let mut db = DatabaseConfig::default();
        assert!(db.validate().is_err());
        db.url = "mysql://localhost".into();
        assert!(db.validate().is_err());
        db.url = "sqlite::memory:".into();
        assert!(db.validate().is_ok());
        db.max_connections = 0;
        assert!(db.validate().is_err());
    }

    #[test]
    fn image_store_validation() {
        let mut img = ImageStoreConfig::default();
        assert!(img.validate().is_ok());
        img.timeout_ms = 0;
        assert!(img.validate().is_err());
        img.timeout_ms = 10;
        img.backend = ImageStoreBackend::Dapr;
        img.dapr_http_endpoint = "localhost:3500".into();
        assert!(img.validate().is_err());
    }
}
