use chrono::{NaiveDate, TimeZone, Utc};
use macro_dashboard_lib::core::cache::ManualClock;
use macro_dashboard_lib::core::loader::Loader;
use macro_dashboard_lib::error::FetchError;
use macro_dashboard_lib::fetcher::sgs::MAX_ERROR_BODY;
use macro_dashboard_lib::fetcher::{DataSource, SgsFetcher};
use macro_dashboard_lib::indicators::Registry;
use macro_dashboard_lib::models::DateRange;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn range() -> DateRange {
    DateRange::from_years(2020, 2021).unwrap()
}

fn monthly_body(values: &[&str]) -> serde_json::Value {
    let records: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, v)| json!({ "data": format!("01/{:02}/2020", i + 1), "valor": v }))
        .collect();
    json!(records)
}

async fn mount_all_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/bcdata\.sgs\.\d+/dados$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monthly_body(&["1.5", "2.5"])))
        .mount(server)
        .await;
}

fn loader(server: &MockServer) -> (Arc<ManualClock>, Loader) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let fetcher = SgsFetcher::new(server.uri(), Duration::from_secs(15));
    let loader = Loader::new(Arc::new(fetcher), Duration::from_secs(3600), clock.clone());
    (clock, loader)
}

#[tokio::test]
async fn fetch_sends_day_first_range_and_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bcdata.sgs.433/dados"))
        .and(query_param("formato", "json"))
        .and(query_param("dataInicial", "01/01/2020"))
        .and(query_param("dataFinal", "31/12/2021"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monthly_body(&["0.21", "x", "0.07"])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = SgsFetcher::new(server.uri(), Duration::from_secs(15));
    let series = fetcher.fetch_series(433, &range()).await.unwrap();

    assert_eq!(series.values(), vec![Some(0.21), None, Some(0.07)]);
    assert_eq!(series.points()[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
}

#[tokio::test]
async fn http_500_is_a_remote_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bcdata.sgs.4189/dados"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let fetcher = SgsFetcher::new(server.uri(), Duration::from_secs(15));
    let err = fetcher.fetch_series(4189, &range()).await.unwrap_err();

    match err {
        FetchError::Status { series_id, status, body } => {
            assert_eq!(series_id, 4189);
            assert_eq!(status, 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn oversized_error_body_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>".repeat(2_000)))
        .mount(&server)
        .await;

    let fetcher = SgsFetcher::new(server.uri(), Duration::from_secs(15));
    let err = fetcher.fetch_series(433, &range()).await.unwrap_err();

    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body.len(), MAX_ERROR_BODY + 3);
            assert!(body.ends_with("..."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(monthly_body(&["1.0"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = SgsFetcher::new(server.uri(), Duration::from_millis(200));
    let err = fetcher.fetch_series(433, &range()).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout { series_id: 433 }), "{err:?}");
}

#[tokio::test]
async fn load_all_omits_failing_indicator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bcdata.sgs.433/dados"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_all_ok(&server).await;

    let (_clock, loader) = loader(&server);
    let table = loader.load_all(&range()).await;

    assert!(!table.contains("IPCA"));
    assert_eq!(table.columns().len(), Registry::get_all_indicators().len() - 1);
    assert_eq!(table.column("Selic").unwrap(), &[Some(1.5), Some(2.5)]);
    assert!(table.dates().iter().all(|d| range().contains(*d)));
}

#[tokio::test]
async fn cached_series_fetched_once_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bcdata.sgs.3698/dados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monthly_body(&["5.1"])))
        .expect(2)
        .mount(&server)
        .await;

    let (clock, loader) = loader(&server);

    let first = loader.fetch(3698, &range()).await.unwrap();
    clock.advance(Duration::from_secs(1800));
    let second = loader.fetch(3698, &range()).await.unwrap();
    assert_eq!(first, second);

    // Past the TTL exactly one more request goes out.
    clock.advance(Duration::from_secs(1800));
    loader.fetch(3698, &range()).await.unwrap();
    loader.fetch(3698, &range()).await.unwrap();
}

#[tokio::test]
async fn everything_failing_yields_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_clock, loader) = loader(&server);
    let err = loader.load_table(&range()).await.unwrap_err();
    assert!(err.to_string().contains("no indicator could be loaded"));
}
