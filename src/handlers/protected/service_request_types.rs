use axum::extract::State;

use crate::extract::{ApiBody, ApiPath, PathParams, parse_body, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{CreateServiceRequestTypeRequest, ServiceRequestType, UpdateServiceRequestTypeRequest};
use crate::state::AppState;

const LIST: Gate = Gate::AnyOf(&[Permission::ServiceRequestTypesView, Permission::ServiceRequestsCreate]);

/// GET /service-requests/types
pub async fn list(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Vec<ServiceRequestType>> {
    state.authorize(&caller, LIST)?;

    let types = state.services.service_request_types.get_all().await?;
    Ok(ApiResponse::success(types, "Types récupérés avec succès"))
}

/// GET /service-requests/type/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<ServiceRequestType> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestTypesView))?;

    let request_type = state.services.service_request_types.get_by_id(id).await?;
    Ok(ApiResponse::success(request_type, "Type récupéré avec succès"))
}

/// POST /service-requests/types
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<ServiceRequestType> {
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestTypesCreate))?;
    let actor = caller.require_user()?;
    let req: CreateServiceRequestTypeRequest = parse_body(&body)?;

    let request_type = state.services.service_request_types.create(req, actor).await?;
    Ok(ApiResponse::created(request_type, "Type créé avec succès"))
}

/// PUT /service-requests/type/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<ServiceRequestType> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestTypesUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateServiceRequestTypeRequest = parse_body(&body)?;

    let request_type = state.services.service_request_types.update(id, req, actor).await?;
    Ok(ApiResponse::success(request_type, "Type mis à jour avec succès"))
}

/// DELETE /service-requests/type/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestTypesDelete))?;
    let actor = caller.require_user()?;

    state.services.service_request_types.delete(id, actor).await?;
    Ok(ApiResponse::empty("Type supprimé avec succès"))
}
