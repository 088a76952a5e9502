// HTTP API Error Types
use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::security::Permission;
use crate::services::ServiceError;

pub const INVALID_DATA: &str = "Données invalides";
pub const INVALID_ID: &str = "Identifiant invalide";
pub const UNAUTHENTICATED: &str = "Utilisateur non authentifié";
pub const INTERNAL: &str = "Erreur interne du serveur";
pub const METHOD_NOT_ALLOWED: &str = "Méthode non autorisée";
pub const PAYLOAD_TOO_LARGE: &str = "Requête trop volumineuse";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request (business rule rejected by a service, bad query parameter)
    BadRequest(String),
    // 400 Bad Request (malformed identifier or body)
    InvalidData {
        message: String,
        details: Option<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidData { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidData { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidData { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to the error envelope. Same shape as the success envelope plus `error`/`code`.
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "data": null,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::InvalidData { details: Some(details), .. } = self {
            response["details"] = json!(details);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Body or parameter that failed to decode; `details` carries the decoder's message
    pub fn invalid_data(details: impl Into<String>) -> Self {
        ApiError::InvalidData {
            message: INVALID_DATA.to_string(),
            details: Some(details.into()),
        }
    }

    pub fn invalid_id() -> Self {
        ApiError::InvalidData {
            message: INVALID_ID.to_string(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized(UNAUTHENTICATED.to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn permission_denied(permissions: &[Permission]) -> Self {
        let codes: Vec<&str> = permissions.iter().map(|p| p.code()).collect();
        ApiError::forbidden(format!("Permission refusée ({})", codes.join(" | ")))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Envelope for a bare status produced outside the handlers (router, body limit, extractors)
    pub fn from_status(status: StatusCode, details: impl Into<String>) -> Self {
        match status {
            StatusCode::METHOD_NOT_ALLOWED => ApiError::MethodNotAllowed(METHOD_NOT_ALLOWED.to_string()),
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(PAYLOAD_TOO_LARGE.to_string()),
            StatusCode::NOT_FOUND => ApiError::not_found("Route introuvable"),
            StatusCode::UNAUTHORIZED => ApiError::unauthenticated(),
            StatusCode::FORBIDDEN => ApiError::forbidden("Accès refusé"),
            s if s.is_server_error() => {
                tracing::error!(status = %s, "Request failed before reaching a handler");
                ApiError::internal_server_error(INTERNAL)
            }
            _ => ApiError::invalid_data(details),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::from_status(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::from_status(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::from_status(rejection.status(), rejection.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Invalid(msg) => ApiError::bad_request(msg),
            ServiceError::Unauthenticated => ApiError::unauthenticated(),
            ServiceError::Internal(e) => {
                // Log the real error but return generic message
                tracing::error!("Service failure: {:#}", e);
                ApiError::internal_server_error(INTERNAL)
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
