use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{ApiBody, ApiPath, ApiQuery, PathParams, parse_body, parse_optional_id, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{
    CreateServiceRequestRequest, ServiceRequest, ServiceRequestFilter, ServiceRequestStatus,
    UpdateServiceRequestRequest,
};
use crate::state::AppState;

const READ: Gate = Gate::AnyOf(&[Permission::ServiceRequestsView, Permission::ServiceRequestsViewAll]);
const FILTER_BY_FILIALE: Gate = Gate::AnyOf(&[
    Permission::ServiceRequestsFilterByFiliale,
    Permission::ServiceRequestsViewAll,
]);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filiale_id: Option<String>,
    /// open, in_progress, resolved or closed
    pub status: Option<String>,
}

/// GET /service-requests - Optionally narrowed by `?filiale_id=` and `?status=`
pub async fn list(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<ServiceRequest>> {
    state.authorize(&caller, READ)?;

    let wants_filiale = query.filiale_id.as_deref().is_some_and(|raw| !raw.is_empty());
    if wants_filiale {
        state.authorize(&caller, FILTER_BY_FILIALE)?;
    }

    let filter = ServiceRequestFilter {
        filiale_id: parse_optional_id(query.filiale_id.as_deref())?,
        status: match query.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ServiceRequestStatus>()
                    .map_err(|_| ApiError::bad_request("Statut invalide"))?,
            ),
        },
    };

    let requests = state.services.service_requests.get_all(filter).await?;
    Ok(ApiResponse::success(requests, "Demandes récupérées avec succès"))
}

/// GET /service-requests/code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<ServiceRequest> {
    state.authorize(&caller, READ)?;

    let request = state.services.service_requests.get_by_code(&code).await?;
    Ok(ApiResponse::success(request, "Demande récupérée avec succès"))
}

/// GET /service-requests/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<ServiceRequest> {
    let id = path_id(&params)?;
    state.authorize(&caller, READ)?;

    let request = state.services.service_requests.get_by_id(id).await?;
    Ok(ApiResponse::success(request, "Demande récupérée avec succès"))
}

/// POST /service-requests
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<ServiceRequest> {
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestsCreate))?;
    let actor = caller.require_user()?;
    let req: CreateServiceRequestRequest = parse_body(&body)?;

    let request = state.services.service_requests.create(req, actor).await?;
    Ok(ApiResponse::created(request, "Demande créée avec succès"))
}

/// PUT /service-requests/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<ServiceRequest> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestsUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateServiceRequestRequest = parse_body(&body)?;

    let request = state.services.service_requests.update(id, req, actor).await?;
    Ok(ApiResponse::success(request, "Demande mise à jour avec succès"))
}

/// DELETE /service-requests/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestsDelete))?;
    let actor = caller.require_user()?;

    state.services.service_requests.delete(id, actor).await?;
    Ok(ApiResponse::empty("Demande supprimée avec succès"))
}

/// POST /service-requests/:id/validate - Sign off a resolved request
pub async fn validate(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<ServiceRequest> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::ServiceRequestsValidate))?;
    let actor = caller.require_user()?;

    let request = state.services.service_requests.validate(id, actor).await?;
    tracing::info!(code = %request.code, actor, "Service request validated");
    Ok(ApiResponse::success(request, "Demande validée avec succès"))
}
