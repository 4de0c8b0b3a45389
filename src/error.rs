use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the remote statistics API. Never retried here.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to SGS series {series_id} timed out")]
    Timeout { series_id: u32 },

    #[error("request to SGS series {series_id} failed: {source}")]
    Request {
        series_id: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("SGS series {series_id} returned {status}: {body}")]
    Status {
        series_id: u32,
        status: u16,
        body: String,
    },

    #[error("SGS series {series_id} sent an unexpected payload: {reason}")]
    Decode { series_id: u32, reason: String },
}

impl FetchError {
    pub fn from_reqwest(series_id: u32, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { series_id }
        } else {
            Self::Request { series_id, source: err }
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(
        "start ({start}) must be before end ({end}), starting in 2000..=2023 and ending in 2001..=2025"
    )]
    InvalidRange { start: String, end: String },

    #[error("no indicator could be loaded for {start}..{end}")]
    EmptyResult { start: String, end: String },

    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownIndicator(_) => StatusCode::NOT_FOUND,
            Self::EmptyResult { .. } | Self::Fetch(_) => StatusCode::BAD_GATEWAY,
        };

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
