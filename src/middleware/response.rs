use axum::{
    body::to_bytes,
    http::{
        header::{ALLOW, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, INTERNAL};

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            data,
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(data, message, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// Success without payload; serialized as `"data": null`
    pub fn empty(message: impl Into<String>) -> Self {
        ApiResponse::success((), message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error(INTERNAL).into_response();
            }
        };

        let envelope: Value = json!({
            "success": true,
            "message": self.message,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

// Upper bound on a bare error body worth reading back as details
const BARE_BODY_LIMIT: usize = 4 * 1024;

/// Rewrite error responses built outside the handlers (405 from the router,
/// 413 from the body limit) into the error envelope
pub async fn envelope_bare_errors(response: Response) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let details = match to_bytes(response.into_body(), BARE_BODY_LIMIT).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    };

    let mut enveloped = ApiError::from_status(status, details).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(ALLOW, allow);
    }
    enveloped
}
