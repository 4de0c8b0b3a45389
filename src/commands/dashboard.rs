use axum::extract::{Path, Query, State};
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

use super::{AppState, RangeQuery};
use crate::analysis::dashboard::{build_dashboard, build_series_view, DashboardView, SeriesView};
use crate::error::DashboardError;
use crate::indicators::{IndicatorDefinition, Registry};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_indicators() -> Json<&'static [IndicatorDefinition]> {
    Json(Registry::get_all_indicators())
}

/// The whole page for one year range. The range is checked before any
/// network access; a range for which nothing loads is a single 502.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardView>, DashboardError> {
    let range = query.resolve(&state.config)?;
    info!("Dashboard requested for {} .. {}", range.start_year(), range.end_year());

    let table = state.loader.load_table(&range).await.map_err(|e| {
        error!("Dashboard load failed: {}", e);
        e
    })?;

    Ok(Json(build_dashboard(&table, &range)))
}

pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<SeriesView>, DashboardError> {
    let range = query.resolve(&state.config)?;
    let definition = Registry::get_definition(&key)
        .ok_or_else(|| DashboardError::UnknownIndicator(key.clone()))?;

    let series = state.loader.fetch_indicator(&definition.key, &range).await?;
    Ok(Json(build_series_view(definition, &series)))
}
