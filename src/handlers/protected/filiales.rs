use axum::extract::State;

use crate::error::ApiError;
use crate::extract::{ApiBody, ApiPath, PathParams, parse_body, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{BranchVisibility, CallerContext, Gate, Permission};
use crate::services::{CreateFilialeRequest, Filiale, ServiceError, UpdateFilialeRequest};
use crate::state::AppState;

const READ: Gate = Gate::AnyOf(&[
    Permission::FilialesView,
    Permission::FilialesViewAll,
    Permission::FilialesManage,
]);

// Request creators filtering by branch need the list as well
const LIST: Gate = Gate::AnyOf(&[
    Permission::FilialesView,
    Permission::FilialesViewAll,
    Permission::FilialesManage,
    Permission::ServiceRequestsFilterByFiliale,
]);

const ELEVATED: &[Permission] = &[Permission::FilialesViewAll, Permission::FilialesManage];

/// `/filiales/:filiale_id`, or `/filiale/:id` on the legacy alias
fn filiale_id(params: &PathParams) -> Result<u64, ApiError> {
    parse_id(params, "filiale_id", "id")
}

/// GET /filiales - All branches, or only the caller's own without an elevated permission
pub async fn list(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Vec<Filiale>> {
    state.authorize(&caller, LIST)?;

    let filiales = match state.visibility(&caller, ELEVATED) {
        BranchVisibility::All => state.services.filiales.get_all().await?,
        BranchVisibility::Own(id) => match state.services.filiales.get_by_id(id).await {
            Ok(filiale) => vec![filiale],
            Err(ServiceError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        },
        BranchVisibility::Nothing => Vec::new(),
    };

    Ok(ApiResponse::success(filiales, "Filiales récupérées avec succès"))
}

/// GET /filiales/software-provider - The branch flagged as software provider
pub async fn software_provider(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Filiale> {
    state.authorize(&caller, READ)?;

    let filiale = state.services.filiales.get_software_provider().await?;
    Ok(ApiResponse::success(filiale, "Filiale éditeur récupérée avec succès"))
}

/// GET /filiales/code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Filiale> {
    state.authorize(&caller, READ)?;

    let filiale = state.services.filiales.get_by_code(&code).await?;
    Ok(ApiResponse::success(filiale, "Filiale récupérée avec succès"))
}

/// GET /filiales/:filiale_id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<Filiale> {
    let id = filiale_id(&params)?;
    state.authorize(&caller, READ)?;

    let filiale = state.services.filiales.get_by_id(id).await?;
    Ok(ApiResponse::success(filiale, "Filiale récupérée avec succès"))
}

/// POST /filiales
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<Filiale> {
    state.authorize(&caller, Gate::Require(Permission::FilialesCreate))?;
    let actor = caller.require_user()?;
    let req: CreateFilialeRequest = parse_body(&body)?;

    let filiale = state.services.filiales.create(req, actor).await?;
    Ok(ApiResponse::created(filiale, "Filiale créée avec succès"))
}

/// PUT /filiales/:filiale_id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<Filiale> {
    let id = filiale_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::FilialesUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateFilialeRequest = parse_body(&body)?;

    let filiale = state.services.filiales.update(id, req, actor).await?;
    Ok(ApiResponse::success(filiale, "Filiale mise à jour avec succès"))
}

/// DELETE /filiales/:filiale_id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = filiale_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::FilialesDelete))?;
    let actor = caller.require_user()?;

    state.services.filiales.delete(id, actor).await?;
    Ok(ApiResponse::empty("Filiale supprimée avec succès"))
}
