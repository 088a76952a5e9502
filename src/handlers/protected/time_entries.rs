use axum::extract::State;
use serde::Deserialize;

use crate::extract::{ApiBody, ApiPath, ApiQuery, PathParams, parse_body, parse_optional_id, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{CreateTimeEntryRequest, TimeEntry, TimeEntryFilter, UpdateTimeEntryRequest};
use crate::state::AppState;

const READ: Gate = Gate::Require(Permission::TimeEntriesView);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub service_request_id: Option<String>,
    pub user_id: Option<String>,
}

/// GET /time-entries - Optionally narrowed by `?service_request_id=` and `?user_id=`
pub async fn list(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<TimeEntry>> {
    state.authorize(&caller, READ)?;

    let filter = TimeEntryFilter {
        service_request_id: parse_optional_id(query.service_request_id.as_deref())?,
        user_id: parse_optional_id(query.user_id.as_deref())?,
    };

    let entries = state.services.time_entries.get_all(filter).await?;
    Ok(ApiResponse::success(entries, "Saisies de temps récupérées avec succès"))
}

/// GET /time-entries/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<TimeEntry> {
    let id = path_id(&params)?;
    state.authorize(&caller, READ)?;

    let entry = state.services.time_entries.get_by_id(id).await?;
    Ok(ApiResponse::success(entry, "Saisie de temps récupérée avec succès"))
}

/// POST /time-entries - Logged under the caller's own user id
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<TimeEntry> {
    state.authorize(&caller, Gate::Require(Permission::TimeEntriesCreate))?;
    let actor = caller.require_user()?;
    let req: CreateTimeEntryRequest = parse_body(&body)?;

    let entry = state.services.time_entries.create(req, actor).await?;
    Ok(ApiResponse::created(entry, "Saisie de temps créée avec succès"))
}

/// PUT /time-entries/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<TimeEntry> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::TimeEntriesUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateTimeEntryRequest = parse_body(&body)?;

    let entry = state.services.time_entries.update(id, req, actor).await?;
    Ok(ApiResponse::success(entry, "Saisie de temps mise à jour avec succès"))
}

/// DELETE /time-entries/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::TimeEntriesDelete))?;
    let actor = caller.require_user()?;

    state.services.time_entries.delete(id, actor).await?;
    Ok(ApiResponse::empty("Saisie de temps supprimée avec succès"))
}

/// POST /time-entries/:id/validate
pub async fn validate(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<TimeEntry> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::TimeEntriesValidate))?;
    let actor = caller.require_user()?;

    let entry = state.services.time_entries.validate(id, actor).await?;
    Ok(ApiResponse::success(entry, "Saisie de temps validée avec succès"))
}
