use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::loader::Loader;
use crate::error::DashboardError;
use crate::models::DateRange;

pub mod dashboard;

pub struct AppState {
    pub config: AppConfig,
    pub loader: Loader,
}

/// `?start_year=&end_year=`, either side falling back to the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl RangeQuery {
    pub fn resolve(&self, config: &AppConfig) -> Result<DateRange, DashboardError> {
        DateRange::from_years(
            self.start_year.unwrap_or(config.default_start_year),
            self.end_year.unwrap_or(config.default_end_year),
        )
    }
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(dashboard::health))
        .route("/api/indicators", get(dashboard::list_indicators))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/series/:key", get(dashboard::get_series))
}
