use axum::{extract::{Path, State}, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingOutput {
    pub key: String,
    pub value: String,
}

/// Unset keys answer with an empty string value.
pub async fn get_setting(State(state): State<AppState>, Path(key): Path<String>) -> Json<SettingOutput> {
    let value = state.settings.get_string(&key).unwrap_or_default();
    Json(SettingOutput { key, value })
}
