use axum::{extract::State, http::StatusCode, Json};
use common::types::HealthReport;
use tracing::error;

use crate::{errors::JsonApiError, state::AppState};

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, JsonApiError> {
    let svc = &state.characters;
    match svc.health().await {
        Ok(()) => Ok(Json(HealthReport::healthy(
            env!("CARGO_PKG_VERSION"),
            svc.store_backend(),
            svc.image_backend(),
        ))),
        Err(e) => {
            error!(error = %e, "health check failed");
            Err(JsonApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Health Check Failed",
                Some("character store unreachable".into()),
            ))
        }
    }
}
