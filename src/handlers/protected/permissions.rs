use axum::extract::State;
use serde::Deserialize;

use crate::extract::{ApiBody, ApiPath, ApiQuery, PathParams, parse_body, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{CreatePermissionRequest, PermissionDefinition, UpdatePermissionRequest};
use crate::state::AppState;

const READ: Gate = Gate::Require(Permission::PermissionsView);
const MANAGE: Gate = Gate::Require(Permission::PermissionsManage);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Code prefix, e.g. `filiales` or `service_requests`
    pub module: Option<String>,
}

/// GET /permissions
pub async fn list(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<PermissionDefinition>> {
    state.authorize(&caller, READ)?;

    let module = query.module.as_deref().filter(|m| !m.is_empty());
    let permissions = state.services.permissions.get_all(module).await?;
    Ok(ApiResponse::success(permissions, "Permissions récupérées avec succès"))
}

/// GET /permissions/code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<PermissionDefinition> {
    state.authorize(&caller, READ)?;

    let permission = state.services.permissions.get_by_code(&code).await?;
    Ok(ApiResponse::success(permission, "Permission récupérée avec succès"))
}

/// GET /permissions/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<PermissionDefinition> {
    let id = path_id(&params)?;
    state.authorize(&caller, READ)?;

    let permission = state.services.permissions.get_by_id(id).await?;
    Ok(ApiResponse::success(permission, "Permission récupérée avec succès"))
}

/// POST /permissions
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<PermissionDefinition> {
    state.authorize(&caller, MANAGE)?;
    let actor = caller.require_user()?;
    let req: CreatePermissionRequest = parse_body(&body)?;

    let permission = state.services.permissions.create(req, actor).await?;
    Ok(ApiResponse::created(permission, "Permission créée avec succès"))
}

/// PUT /permissions/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<PermissionDefinition> {
    let id = path_id(&params)?;
    state.authorize(&caller, MANAGE)?;
    let actor = caller.require_user()?;
    let req: UpdatePermissionRequest = parse_body(&body)?;

    let permission = state.services.permissions.update(id, req, actor).await?;
    Ok(ApiResponse::success(permission, "Permission mise à jour avec succès"))
}

/// DELETE /permissions/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, MANAGE)?;
    let actor = caller.require_user()?;

    state.services.permissions.delete(id, actor).await?;
    Ok(ApiResponse::empty("Permission supprimée avec succès"))
}
