use axum::extract::State;

use crate::extract::{ApiBody, ApiPath, PathParams, parse_body, path_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{CreateKbCategoryRequest, KbCategory, UpdateKbCategoryRequest};
use crate::state::AppState;

const READ: Gate = Gate::Require(Permission::KbCategoriesView);

/// GET /kb/categories
pub async fn list(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Vec<KbCategory>> {
    state.authorize(&caller, READ)?;

    let categories = state.services.kb_categories.get_all().await?;
    Ok(ApiResponse::success(categories, "Catégories récupérées avec succès"))
}

/// GET /kb/categories/code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<KbCategory> {
    state.authorize(&caller, READ)?;

    let category = state.services.kb_categories.get_by_code(&code).await?;
    Ok(ApiResponse::success(category, "Catégorie récupérée avec succès"))
}

/// GET /kb/categories/:id
pub async fn get(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<KbCategory> {
    let id = path_id(&params)?;
    state.authorize(&caller, READ)?;

    let category = state.services.kb_categories.get_by_id(id).await?;
    Ok(ApiResponse::success(category, "Catégorie récupérée avec succès"))
}

/// POST /kb/categories
pub async fn create(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiBody(body): ApiBody,
) -> ApiResult<KbCategory> {
    state.authorize(&caller, Gate::Require(Permission::KbCategoriesCreate))?;
    let actor = caller.require_user()?;
    let req: CreateKbCategoryRequest = parse_body(&body)?;

    let category = state.services.kb_categories.create(req, actor).await?;
    Ok(ApiResponse::created(category, "Catégorie créée avec succès"))
}

/// PUT /kb/categories/:id
pub async fn update(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
    ApiBody(body): ApiBody,
) -> ApiResult<KbCategory> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::KbCategoriesUpdate))?;
    let actor = caller.require_user()?;
    let req: UpdateKbCategoryRequest = parse_body(&body)?;

    let category = state.services.kb_categories.update(id, req, actor).await?;
    Ok(ApiResponse::success(category, "Catégorie mise à jour avec succès"))
}

/// DELETE /kb/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiPath(params): ApiPath<PathParams>,
) -> ApiResult<()> {
    let id = path_id(&params)?;
    state.authorize(&caller, Gate::Require(Permission::KbCategoriesDelete))?;
    let actor = caller.require_user()?;

    state.services.kb_categories.delete(id, actor).await?;
    Ok(ApiResponse::empty("Catégorie supprimée avec succès"))
}
