use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::DataSource;
use crate::error::FetchError;
use crate::models::{DataPoint, DateRange, ObservationSeries};

pub const DEFAULT_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Upstream error bodies are cut to this many bytes before they reach an
/// error or a log line.
pub const MAX_ERROR_BODY: usize = 512;

/// Banco Central do Brasil "Sistema Gerenciador de Séries Temporais" client.
pub struct SgsFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SgsFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("MacroDashboard/1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn series_url(&self, series_id: u32) -> String {
        format!("{}/bcdata.sgs.{}/dados", self.base_url, series_id)
    }

    /// Parses `[{"data": "dd/mm/YYYY", "valor": "1.23"}, ...]`.
    ///
    /// A value that does not parse becomes `None`. A record whose date does
    /// not parse is dropped, as is anything outside `range`.
    fn parse_observations(
        series_id: u32,
        json: &Value,
        range: &DateRange,
    ) -> Result<ObservationSeries, FetchError> {
        let records = json.as_array().ok_or_else(|| FetchError::Decode {
            series_id,
            reason: "expected a JSON array of observations".to_string(),
        })?;

        let mut points = Vec::with_capacity(records.len());

        for record in records {
            let Some(date_str) = record["data"].as_str() else {
                warn!("SGS {}: record without a date field, skipping", series_id);
                continue;
            };

            let date = match NaiveDate::parse_from_str(date_str.trim(), "%d/%m/%Y") {
                Ok(date) => date,
                Err(e) => {
                    warn!("SGS {}: bad date '{}' ({}), skipping", series_id, date_str, e);
                    continue;
                }
            };

            if !range.contains(date) {
                debug!("SGS {}: {} outside requested range, skipping", series_id, date);
                continue;
            }

            points.push(DataPoint::new(date, parse_value(&record["valor"])));
        }

        Ok(ObservationSeries::from_points(points))
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

fn parse_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[async_trait]
impl DataSource for SgsFetcher {
    fn name(&self) -> &str {
        "sgs"
    }

    async fn fetch_series(
        &self,
        series_id: u32,
        range: &DateRange,
    ) -> Result<ObservationSeries, FetchError> {
        let url = self.series_url(series_id);
        let (start, end) = (range.sgs_start(), range.sgs_end());

        debug!("Fetching SGS {} ({} .. {})", series_id, start, end);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("formato", "json"),
                ("dataInicial", start.as_str()),
                ("dataFinal", end.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(series_id, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = truncate_body(resp.text().await.unwrap_or_default());
            return Err(FetchError::Status { series_id, status, body });
        }

        let json: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { series_id }
            } else {
                FetchError::Decode { series_id, reason: e.to_string() }
            }
        })?;

        let series = Self::parse_observations(series_id, &json, range)?;
        info!("SGS {}: {} observations ({} .. {})", series_id, series.len(), start, end);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range() -> DateRange {
        DateRange::from_years(2019, 2021).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!([
            { "data": "01/02/2020", "valor": "0.25" },
            { "data": "01/01/2020", "valor": "0.21" }
        ]);

        let series = SgsFetcher::parse_observations(433, &json_data, &range()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, d(2020, 1, 1));
        assert_eq!(series.points()[0].value, Some(0.21));
        assert_eq!(series.points()[1].value, Some(0.25));
    }

    #[test]
    fn test_parse_unparseable_value_is_missing_not_zero() {
        let json_data = json!([
            { "data": "01/01/2020", "valor": "" },
            { "data": "01/02/2020", "valor": "n/d" },
            { "data": "01/03/2020", "valor": 3.5 }
        ]);

        let series = SgsFetcher::parse_observations(433, &json_data, &range()).unwrap();
        assert_eq!(series.values(), vec![None, None, Some(3.5)]);
    }

    #[test]
    fn test_parse_skips_bad_dates_and_out_of_range() {
        let json_data = json!([
            { "data": "2020-01-01", "valor": "1.0" },
            { "data": "01/01/2018", "valor": "2.0" },
            { "data": "15/06/2020", "valor": "3.0" }
        ]);

        let series = SgsFetcher::parse_observations(433, &json_data, &range()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].date, d(2020, 6, 15));
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "Value(s) not found" });
        let result = SgsFetcher::parse_observations(433, &json_data, &range());
        assert!(matches!(result, Err(FetchError::Decode { series_id: 433, .. })));
    }

    #[test]
    fn test_series_url() {
        let fetcher = SgsFetcher::new("http://localhost:9000/", DEFAULT_TIMEOUT);
        assert_eq!(fetcher.series_url(433), "http://localhost:9000/bcdata.sgs.433/dados");
        assert_eq!(fetcher.name(), "sgs");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("upstream down".to_string()), "upstream down");

        let long = truncate_body("x".repeat(4096));
        assert_eq!(long.len(), MAX_ERROR_BODY + 3);
        assert!(long.ends_with("..."));

        // Never splits a multi-byte character.
        let accented = truncate_body(format!("a{}", "é".repeat(600)));
        assert!(accented.len() <= MAX_ERROR_BODY + 3);
        assert!(accented.starts_with("aé"));
    }
}
