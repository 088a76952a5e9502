use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::{envelope_bare_errors, jwt_auth_middleware, require_auth_middleware};
use crate::state::AppState;

/// Full application router with every global layer applied
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes())
        .merge(filiale_routes())
        .merge(kb_routes())
        .merge(request_source_routes())
        .merge(service_request_routes())
        .merge(time_entry_routes())
        .merge(permission_routes())
        .merge(stats_routes())
        .route_layer(from_fn(require_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/filiales/active", get(public::filiales_active))
        // Protected
        .merge(protected_routes)
        .fallback(public::fallback)
        // Token decoding runs for every route, identity is only required on protected ones
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        // 405 and 413 are produced below the handlers and carry no envelope of their own
        .layer(map_response(envelope_bare_errors))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(protected::auth::me))
}

fn filiale_routes() -> Router<AppState> {
    use protected::filiales;

    Router::new()
        .route("/filiales", get(filiales::list).post(filiales::create))
        .route("/filiales/software-provider", get(filiales::software_provider))
        .route("/filiales/code/:code", get(filiales::get_by_code))
        .route(
            "/filiales/:filiale_id",
            get(filiales::get).put(filiales::update).delete(filiales::delete),
        )
        // Legacy singular alias
        .route(
            "/filiale/:id",
            get(filiales::get).put(filiales::update).delete(filiales::delete),
        )
}

fn kb_routes() -> Router<AppState> {
    use protected::kb_categories;

    Router::new()
        .route("/kb/categories", get(kb_categories::list).post(kb_categories::create))
        .route("/kb/categories/code/:code", get(kb_categories::get_by_code))
        .route(
            "/kb/categories/:id",
            get(kb_categories::get)
                .put(kb_categories::update)
                .delete(kb_categories::delete),
        )
}

fn request_source_routes() -> Router<AppState> {
    use protected::request_sources;

    Router::new()
        .route("/request-sources", get(request_sources::list).post(request_sources::create))
        .route("/request-sources/code/:code", get(request_sources::get_by_code))
        .route(
            "/request-sources/:id",
            get(request_sources::get)
                .put(request_sources::update)
                .delete(request_sources::delete),
        )
}

fn service_request_routes() -> Router<AppState> {
    use protected::{service_request_types as types, service_requests};

    Router::new()
        // Request types
        .route("/service-requests/types", get(types::list).post(types::create))
        .route(
            "/service-requests/type/:id",
            get(types::get).put(types::update).delete(types::delete),
        )
        // Requests
        .route(
            "/service-requests",
            get(service_requests::list).post(service_requests::create),
        )
        .route("/service-requests/code/:code", get(service_requests::get_by_code))
        .route(
            "/service-requests/:id",
            get(service_requests::get)
                .put(service_requests::update)
                .delete(service_requests::delete),
        )
        .route("/service-requests/:id/validate", post(service_requests::validate))
}

fn time_entry_routes() -> Router<AppState> {
    use protected::time_entries;

    Router::new()
        .route("/time-entries", get(time_entries::list).post(time_entries::create))
        .route(
            "/time-entries/:id",
            get(time_entries::get)
                .put(time_entries::update)
                .delete(time_entries::delete),
        )
        .route("/time-entries/:id/validate", post(time_entries::validate))
}

fn permission_routes() -> Router<AppState> {
    use protected::permissions;

    Router::new()
        .route("/permissions", get(permissions::list).post(permissions::create))
        .route("/permissions/code/:code", get(permissions::get_by_code))
        .route(
            "/permissions/:id",
            get(permissions::get).put(permissions::update).delete(permissions::delete),
        )
}

fn stats_routes() -> Router<AppState> {
    use protected::statistics;

    Router::new()
        .route("/stats/overview", get(statistics::overview))
        .route("/stats/workload", get(statistics::workload))
        .route("/stats/trends", get(statistics::trends))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{Claims, JwtKeys};
    use crate::config::DEV_JWT_SECRET;
    use crate::security::{Authorizer, CallerContext, Permission};
    use crate::services::Services;
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{ALLOW, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
            Method, Request, StatusCode,
        },
    };
    use serde_json::Value;
    use tower::ServiceExt;

    struct DenyAll;

    impl Authorizer for DenyAll {
        fn is_granted(&self, _caller: &CallerContext, _permission: Permission) -> bool {
            false
        }
    }

    fn state() -> AppState {
        AppState::new(Services::in_memory(), JwtKeys::new(DEV_JWT_SECRET))
    }

    fn router() -> Router {
        app(state(), &AppConfig::development())
    }

    fn bearer(permissions: &[Permission], filiale_id: Option<u64>) -> String {
        let claims = Claims::new(
            Some(1),
            filiale_id,
            permissions.iter().map(|p| p.code().to_string()).collect(),
            1,
        );
        let token = JwtKeys::new(DEV_JWT_SECRET).generate(&claims).unwrap();
        format!("Bearer {}", token)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_to(router(), request).await
    }

    async fn send_to(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str, auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let (status, body) = send(get_request("/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route introuvable");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let (status, body) = send(get_request("/filiales", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_token_is_rejected_on_public_route() {
        let (status, _) = send(get_request("/filiales/active", Some("Bearer not-a-jwt".into()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden() {
        let auth = bearer(&[Permission::StatsView], None);
        let (status, body) = send(get_request("/kb/categories", Some(auth))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn static_segments_win_over_ids() {
        let auth = bearer(&[Permission::ServiceRequestTypesView], None);
        let (status, body) = send(get_request("/service-requests/types", Some(auth))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_array());
    }

    #[tokio::test]
    async fn legacy_alias_parses_id() {
        let auth = bearer(&[Permission::FilialesView], None);
        let (status, body) = send(get_request("/filiale/abc", Some(auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], crate::error::INVALID_ID);
    }

    #[tokio::test]
    async fn injected_authorizer_overrides_token_permissions() {
        let router = app(state().with_authorizer(Arc::new(DenyAll)), &AppConfig::development());
        let auth = bearer(Permission::ALL, Some(1));

        let (status, body) = send_to(router, get_request("/stats/overview", Some(auth))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Permission refusée (stats.view)");
    }

    fn post_request(uri: &str, auth: String, body: &'static str, with_length: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/json");
        if with_length {
            builder = builder.header(CONTENT_LENGTH, body.len());
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn small_body_router() -> Router {
        let mut config = AppConfig::development();
        config.api.max_request_size_bytes = 16;
        app(state(), &config)
    }

    #[tokio::test]
    async fn duplicate_query_parameter_is_invalid_data() {
        let auth = bearer(&[Permission::StatsView], None);
        let (status, body) = send(get_request("/stats/overview?period=week&period=month", Some(auth))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], crate::error::INVALID_DATA);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["details"].as_str().unwrap().contains("period"));
    }

    #[tokio::test]
    async fn undecodable_path_segment_is_invalid_data() {
        let auth = bearer(&[Permission::FilialesView], None);
        let (status, body) = send(get_request("/filiales/%FF", Some(auth))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn oversized_streamed_body_is_enveloped_413() {
        let auth = bearer(&[Permission::FilialesCreate], Some(1));
        let request = post_request("/filiales", auth, r#"{"code": "ABJ", "name": "Abidjan"}"#, false);

        let (status, body) = send_to(small_body_router(), request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], crate::error::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn oversized_declared_body_is_enveloped_413() {
        let auth = bearer(&[Permission::FilialesCreate], Some(1));
        let request = post_request("/filiales", auth, r#"{"code": "ABJ", "name": "Abidjan"}"#, true);

        let (status, body) = send_to(small_body_router(), request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], crate::error::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unsupported_method_is_enveloped_405() {
        let auth = bearer(&[Permission::FilialesUpdate], Some(1));
        let request = Request::builder()
            .method(Method::PATCH)
            .uri("/filiales/1")
            .header(AUTHORIZATION, auth)
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(ALLOW));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], crate::error::METHOD_NOT_ALLOWED);
        assert!(body["data"].is_null());
    }
}
