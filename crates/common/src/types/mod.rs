use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload returned by `GET /health`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub services: ServiceStatus,
}

/// 各依赖组件的状态描述
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub database: String,
    pub image_store: String,
}

impl HealthReport {
    pub fn healthy(version: &str, database: &str, image_store: &str) -> Self {
        Self {
            status: "Healthy".to_string(),
            timestamp: Utc::now(),
            version: version.to_string(),
            services: ServiceStatus {
                database: database.to_string(),
                image_store: image_store.to_string(),
            },
        }
    }
}
