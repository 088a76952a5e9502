use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::security::CallerContext;
use crate::state::AppState;

/// Decodes an optional bearer token into a [`CallerContext`] request extension.
///
/// No header leaves the request anonymous (public routes stay reachable);
/// a header that is present but malformed, expired or badly signed is a 401.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_jwt_from_headers(request.headers())? else {
        return Ok(next.run(request).await);
    };

    let claims = state.jwt.validate(&token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Jeton d'authentification invalide")
    })?;

    let caller = CallerContext::from(claims);
    tracing::debug!(user_id = ?caller.user_id, filiale_id = ?caller.filiale_id, "Caller authenticated");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Rejects requests that reached a protected route without a caller context
pub async fn require_auth_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<CallerContext>().is_none() {
        return Err(ApiError::unauthorized("En-tête Authorization manquant"));
    }

    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, `None` when the header is absent
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Format d'en-tête Authorization invalide"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err(ApiError::unauthorized("Jeton d'authentification vide")),
        None => Err(ApiError::unauthorized("L'en-tête Authorization doit utiliser le format Bearer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_jwt_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_jwt_from_headers(&headers("Bearer abc.def.ghi")).unwrap(),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
    }
}
