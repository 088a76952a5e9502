use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service description
pub async fn root() -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Ok(ApiResponse::success(
        json!({
            "name": "ITSM API",
            "version": version,
            "endpoints": {
                "public": ["/", "/health", "/filiales/active"],
                "auth": "/auth/me",
                "filiales": "/filiales[/:filiale_id]",
                "kb": "/kb/categories[/:id]",
                "request_sources": "/request-sources[/:id]",
                "service_requests": "/service-requests[/:id], /service-requests/types, /service-requests/type/:id",
                "time_entries": "/time-entries[/:id]",
                "permissions": "/permissions[/:id]",
                "stats": "/stats/overview, /stats/workload, /stats/trends",
            }
        }),
        "ITSM API",
    ))
}

/// GET /health - Liveness probe
pub async fn health() -> ApiResult<Value> {
    Ok(ApiResponse::success(
        json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }),
        "Service opérationnel",
    ))
}

/// Any unmatched route
pub async fn fallback() -> ApiError {
    ApiError::not_found("Route introuvable")
}
