use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use super::dto::Message;

#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<Message>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(Message::new(message)),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

/// Only an invalid period is a client error; every lookup failure is a 404.
impl From<GatewayError> for Error {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::InvalidPeriod(_) => Self::new(StatusCode::BAD_REQUEST, "Invalid length"),
            GatewayError::TickerNotFound(_)
            | GatewayError::UpstreamUnavailable(_)
            | GatewayError::MissingField(_)
            | GatewayError::SchemaMismatch { .. }
            | GatewayError::Timeout(_) => Self::new(StatusCode::NOT_FOUND, "Ticker not found"),
        }
    }
}

/// Failures reported by the ticker gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid period {0:?}")]
    InvalidPeriod(String),
    #[error("ticker not found: {0}")]
    TickerNotFound(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("missing field {0:?} in upstream response")]
    MissingField(&'static str),
    #[error("field {field:?} in upstream response is not a {expected}")]
    SchemaMismatch {
        field: &'static str,
        expected: &'static str,
    },
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<UpstreamError> for GatewayError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::NotFound(what) => GatewayError::TickerNotFound(what),
            other => GatewayError::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Failures reported by a market-data provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("API error {code}: {description}")]
    Api { code: String, description: String },
    #[error("upstream rejected the session credentials")]
    Unauthorized,
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for UpstreamError {
    fn from(error: serde_json::Error) -> Self {
        UpstreamError::Parse(error.to_string())
    }
}
