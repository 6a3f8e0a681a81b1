use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// Problem-style JSON error (`application/problem+json`).
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "type": "about:blank",
            "title": self.title,
            "status": self.status.as_u16(),
            "detail": self.detail,
        });
        let mut resp = (self.status, Json(body)).into_response();
        resp.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        resp
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        match e {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            // 内部错误细节只写日志，不返回给调用方
            ServiceError::StoreUnavailable(msg) => {
                error!(code, error = %msg, "character store unavailable");
                JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Store Unavailable",
                    Some("the character store is currently unavailable".into()),
                )
            }
            ServiceError::ImageUnavailable(msg) => {
                error!(code, error = %msg, "image store unavailable");
                JsonApiError::new(
                    StatusCode::BAD_GATEWAY,
                    "Image Store Unavailable",
                    Some("the image store could not process the request".into()),
                )
            }
        }
    }
}

/// Malformed or mistyped request bodies are validation failures.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(rejection.body_text()))
    }
}

/// Ids that are not a valid `i32` cannot name a character.
impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(rejection.body_text()))
    }
}
