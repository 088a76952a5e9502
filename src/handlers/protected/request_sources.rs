use axum::extract::State;

use crate::extract::{ApiBody, ApiPath, PathParams, parse_body, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{CreateRequestSourceRequest, RequestSource, UpdateRequestSourceRequest};
use crate::state::AppState;

// Anyone allowed to open a request must be able to pick its source
const LIST: Gate = Gate::AnyOf(&[Permission::RequestSourcesView, Permission::ServiceRequestsCreate]);
const READ: Gate = Gate::Require(Permission::RequestSourcesView);

/// GET /request-sources
pub async fn list(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Vec<RequestSource>> {
    state.authorize(&caller, LIST)?;

    let sources = state.services.request_sources.get_all().await?;
    Ok(ApiResponse::success(sources, "Sources récupérées avec succès"))
}

/// GET /request-sources/code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<RequestSource> {
    state.authorize(&caller, READ)?;

    let source = state.services.request_sources.get_by_code(&code).await?;
    Ok(ApiResponse::success(source, "Source récupérée avec succès"))
}

/// GET /request-sources/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<RequestSource> {
    let id = path_id(&params)?;
    state.authorize(&caller, READ)?;

    let source = state.services.request_sources.get_by_id(id).await?;
    Ok(ApiResponse::success(source, "Source récupérée avec succès"))
}

/// POST /request-sources
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<RequestSource> {
    state.authorize(&caller, Gate::Require(Permission::RequestSourcesCreate))?;
    let actor = caller.require_user()?;
    let req: CreateRequestSourceRequest = parse_body(&body)?;

    let source = state.services.request_sources.create(req, actor).await?;
    Ok(ApiResponse::created(source, "Source créée avec succès"))
}

/// PUT /request-sources/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<RequestSource> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::RequestSourcesUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateRequestSourceRequest = parse_body(&body)?;

    let source = state.services.request_sources.update(id, req, actor).await?;
    Ok(ApiResponse::success(source, "Source mise à jour avec succès"))
}

/// DELETE /request-sources/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::RequestSourcesDelete))?;
    let actor = caller.require_user()?;

    state.services.request_sources.delete(id, actor).await?;
    Ok(ApiResponse::empty("Source supprimée avec succès"))
}
