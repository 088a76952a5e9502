use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate};
use crate::services::Filiale;
use crate::state::AppState;

/// GET /filiales/active - Active branches for the registration form
pub async fn active(State(state): State<AppState>, caller: CallerContext) -> ApiResult<Vec<Filiale>> {
    state.authorize(&caller, Gate::Public)?;

    let filiales = state.services.filiales.get_active().await?;
    Ok(ApiResponse::success(filiales, "Filiales actives récupérées avec succès"))
}
