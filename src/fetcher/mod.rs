use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{DateRange, ObservationSeries};

pub mod sgs;

pub use sgs::SgsFetcher;

/// A remote provider of numbered time series.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// One network request for `series_id` restricted to `range`.
    async fn fetch_series(
        &self,
        series_id: u32,
        range: &DateRange,
    ) -> Result<ObservationSeries, FetchError>;
}
