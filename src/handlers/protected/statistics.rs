use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{ApiQuery, parse_optional_id, parse_or_default};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Gate, Permission};
use crate::services::{Metric, Overview, Period, TrendPeriod, TrendSeries, UserWorkload};
use crate::state::AppState;

const READ: Gate = Gate::Require(Permission::StatsView);
const INVALID_PERIOD: &str = "Période invalide";

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// week, month, quarter or year
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkloadQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub metric: Option<String>,
    /// 1month, 3months, 6months or year
    pub period: Option<String>,
}

/// GET /stats/overview?period=
pub async fn overview(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<OverviewQuery>,
) -> ApiResult<Overview> {
    state.authorize(&caller, READ)?;
    let period = parse_or_default(query.period.as_deref(), Period::default(), INVALID_PERIOD)?;

    let overview = state.services.statistics.overview(period).await?;
    Ok(ApiResponse::success(overview, "Statistiques récupérées avec succès"))
}

/// GET /stats/workload?userId=&period=
pub async fn workload(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<WorkloadQuery>,
) -> ApiResult<Vec<UserWorkload>> {
    state.authorize(&caller, READ)?;
    let user_id = parse_optional_id(query.user_id.as_deref())?;
    let period = parse_or_default(query.period.as_deref(), Period::default(), INVALID_PERIOD)?;

    let workload = state.services.statistics.workload(user_id, period).await?;
    Ok(ApiResponse::success(workload, "Charge de travail récupérée avec succès"))
}

/// GET /stats/trends?metric=&period=
pub async fn trends(
    State(state): State<AppState>,
    caller: CallerContext,
    ApiQuery(query): ApiQuery<TrendsQuery>,
) -> ApiResult<TrendSeries> {
    state.authorize(&caller, READ)?;

    let metric = match query.metric.as_deref() {
        None | Some("") => return Err(ApiError::bad_request("Paramètre 'metric' manquant")),
        Some(raw) => raw
            .parse::<Metric>()
            .map_err(|_| ApiError::bad_request("Métrique invalide"))?,
    };
    let period = parse_or_default(query.period.as_deref(), TrendPeriod::default(), INVALID_PERIOD)?;

    let series = state.services.statistics.trends(metric, period).await?;
    Ok(ApiResponse::success(series, "Tendances récupérées avec succès"))
}
