use macro_dashboard_lib::config::AppConfig;
use macro_dashboard_lib::fetcher::{DataSource, SgsFetcher};
use macro_dashboard_lib::indicators::Registry;
use macro_dashboard_lib::models::DateRange;

/// Usage: check_series [start_year] [end_year]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    macro_dashboard_lib::init_tracing();

    let config = AppConfig::from_env();
    let mut args = std::env::args().skip(1);
    let start_year = match args.next() {
        Some(s) => s.parse()?,
        None => config.default_start_year,
    };
    let end_year = match args.next() {
        Some(s) => s.parse()?,
        None => config.default_end_year,
    };

    let range = DateRange::from_years(start_year, end_year)?;
    let fetcher = SgsFetcher::new(config.sgs_base_url.clone(), config.fetch_timeout);

    println!("Diagnostic - {} from {} to {}", config.sgs_base_url, range.sgs_start(), range.sgs_end());
    println!("\n{:<12} | {:<6} | {:<6} | {:<8} | {:<12} | {:<10}", "Key", "SGS", "Count", "Missing", "Latest Date", "Latest Val");
    println!("{}", "-".repeat(70));

    for definition in Registry::get_all_indicators() {
        match fetcher.fetch_series(definition.series_id, &range).await {
            Ok(series) => {
                let missing = series.points().iter().filter(|p| p.value.is_none()).count();
                match series.points().iter().rev().find(|p| p.value.is_some()) {
                    Some(latest) => println!(
                        "{:<12} | {:<6} | {:<6} | {:<8} | {:<12} | {:.4}",
                        definition.key,
                        definition.series_id,
                        series.len(),
                        missing,
                        latest.date.to_string(),
                        latest.value.unwrap_or_default()
                    ),
                    None => println!(
                        "{:<12} | {:<6} | {:<6} | {:<8} | {:<12} | -",
                        definition.key, definition.series_id, series.len(), missing, "NO DATA"
                    ),
                }
            }
            Err(e) => println!("{:<12} | {:<6} | ERROR: {}", definition.key, definition.series_id, e),
        }
    }

    println!("\nDone.");
    Ok(())
}
