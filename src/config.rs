use std::env;
use std::time::Duration;

use crate::fetcher::sgs::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Settings read from the environment (and `.env`, if present). Only hosting
/// concerns come from the environment; the fetch timeout and cache TTL are
/// fixed.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    pub sgs_base_url: String,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub default_start_year: i32,
    pub default_end_year: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8050,
            sgs_base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            default_start_year: 2010,
            default_end_year: 2025,
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            bind: env_str("DASHBOARD_BIND", &defaults.bind),
            port: env_parse("DASHBOARD_PORT", defaults.port),
            sgs_base_url: env_str("SGS_BASE_URL", &defaults.sgs_base_url),
            fetch_timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            default_start_year: env_parse("DEFAULT_START_YEAR", defaults.default_start_year),
            default_end_year: env_parse("DEFAULT_END_YEAR", defaults.default_end_year),
        }
    }
}
