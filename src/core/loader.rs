use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::cache::{CacheKey, Clock, TtlCache};
use crate::core::timeseries::outer_join;
use crate::error::{DashboardError, FetchError};
use crate::fetcher::DataSource;
use crate::indicators::{IndicatorDefinition, Registry};
use crate::models::{AggregateTable, DateRange, ObservationSeries};

/// Result of loading one registered indicator.
#[derive(Debug)]
pub enum IndicatorOutcome {
    Loaded(Arc<ObservationSeries>),
    Failed(FetchError),
}

/// Pulls registered series through the shared cache. Built once at startup.
pub struct Loader {
    source: Arc<dyn DataSource>,
    series_cache: TtlCache<CacheKey, ObservationSeries>,
    table_cache: TtlCache<CacheKey, AggregateTable>,
}

impl Loader {
    pub fn new(source: Arc<dyn DataSource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            series_cache: TtlCache::new(ttl, Arc::clone(&clock)),
            table_cache: TtlCache::new(ttl, clock),
        }
    }

    /// One series through the cache. Failures are not cached.
    pub async fn fetch(
        &self,
        series_id: u32,
        range: &DateRange,
    ) -> Result<Arc<ObservationSeries>, FetchError> {
        self.series_cache
            .get_or_try_compute(CacheKey::series(series_id, *range), || {
                self.source.fetch_series(series_id, range)
            })
            .await
    }

    pub async fn fetch_indicator(
        &self,
        key: &str,
        range: &DateRange,
    ) -> Result<Arc<ObservationSeries>, DashboardError> {
        let definition = Registry::get_definition(key)
            .ok_or_else(|| DashboardError::UnknownIndicator(key.to_string()))?;
        Ok(self.fetch(definition.series_id, range).await?)
    }

    /// Fetches every registered indicator concurrently, one outcome each,
    /// in registry order.
    pub async fn load_outcomes(
        &self,
        range: &DateRange,
    ) -> Vec<(&'static IndicatorDefinition, IndicatorOutcome)> {
        let requests = Registry::get_all_indicators().iter().map(|definition| async move {
            let outcome = match self.fetch(definition.series_id, range).await {
                Ok(series) => IndicatorOutcome::Loaded(series),
                Err(e) => IndicatorOutcome::Failed(e),
            };
            (definition, outcome)
        });

        join_all(requests).await
    }

    /// Every indicator that loaded, outer-joined on date. Indicators that
    /// failed are left out; if all fail the table is empty. The result is
    /// cached either way.
    pub async fn load_all(&self, range: &DateRange) -> Arc<AggregateTable> {
        self.table_cache
            .get_or_compute(CacheKey::all(*range), || self.assemble(range))
            .await
    }

    /// [`load_all`](Self::load_all), with an empty table reported as
    /// [`DashboardError::EmptyResult`].
    pub async fn load_table(
        &self,
        range: &DateRange,
    ) -> Result<Arc<AggregateTable>, DashboardError> {
        let table = self.load_all(range).await;
        if table.is_empty() {
            return Err(DashboardError::EmptyResult {
                start: range.sgs_start(),
                end: range.sgs_end(),
            });
        }
        Ok(table)
    }

    async fn assemble(&self, range: &DateRange) -> AggregateTable {
        let outcomes = self.load_outcomes(range).await;
        let total = outcomes.len();

        let mut loaded = Vec::with_capacity(total);
        for (definition, outcome) in outcomes {
            match outcome {
                IndicatorOutcome::Loaded(series) => {
                    loaded.push((definition.key.clone(), (*series).clone()));
                }
                IndicatorOutcome::Failed(e) => {
                    warn!(
                        "Skipping {} ({} series {}): {}",
                        definition.key,
                        self.source.name(),
                        definition.series_id,
                        e
                    );
                }
            }
        }

        info!(
            "Loaded {}/{} indicators from {} for {} .. {}",
            loaded.len(),
            total,
            self.source.name(),
            range.sgs_start(),
            range.sgs_end()
        );

        outer_join(loaded)
    }
}
