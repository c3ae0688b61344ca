//! Core types for exchange-rate tool dispatch

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned when a historical lookup names no date at all
pub const MISSING_DATE_MESSAGE: &str =
    "You must provide either a specific date, a start date, or a date range.";

/// Query parameters sent upstream, in insertion order
pub type QueryParams = Vec<(String, String)>;

/// Base currency and symbol filter shared by the rate tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuery {
    /// Currency the rates are expressed against (upstream defaults to EUR)
    pub base_currency: Option<String>,
    /// Target currencies; empty or absent means all of them
    pub symbols: Option<Vec<String>>,
}

impl RateQuery {
    pub fn new(base_currency: Option<String>, symbols: Option<Vec<String>>) -> Self {
        Self {
            base_currency,
            symbols,
        }
    }

    /// Build the `base`/`symbols` query parameters.
    ///
    /// Empty strings and empty symbol lists are treated as absent, so the
    /// corresponding parameter is left out instead of sent blank.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(base) = present(self.base_currency.as_deref()) {
            params.push(("base".to_string(), base.to_string()));
        }
        if let Some(symbols) = self.symbols.as_ref().filter(|s| !s.is_empty()) {
            params.push(("symbols".to_string(), symbols.join(",")));
        }
        params
    }
}

/// Date selector for a historical lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSpec {
    /// A single day
    Specific(String),
    /// From `start` up to the latest available day
    OpenRange { start: String },
    /// From `start` through `end`
    ClosedRange { start: String, end: String },
}

impl DateSpec {
    /// Pick the date form from the caller's fields.
    ///
    /// Priority is closed range, open range, then specific date. An `end`
    /// without a `start` is ignored.
    pub fn from_fields(
        specific_date: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, ServiceError> {
        match (present(start_date), present(end_date), present(specific_date)) {
            (Some(start), Some(end), _) => Ok(Self::ClosedRange {
                start: start.to_string(),
                end: end.to_string(),
            }),
            (Some(start), None, _) => Ok(Self::OpenRange {
                start: start.to_string(),
            }),
            (None, _, Some(date)) => Ok(Self::Specific(date.to_string())),
            (None, _, None) => Err(ServiceError::Validation(MISSING_DATE_MESSAGE.to_string())),
        }
    }

    /// Path segment relative to the upstream base URL
    pub fn path(&self) -> String {
        match self {
            Self::Specific(date) => format!("/{}", date),
            Self::OpenRange { start } => format!("/{}..", start),
            Self::ClosedRange { start, end } => format!("/{}..{}", start, end),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Errors raised while configuring, starting or serving the tools
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid value '{value}' for {name}; allowed values are: {}", .allowed.join(", "))]
    Configuration {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("{0}")]
    Validation(String),

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream response is not valid JSON: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Whether the error aborts the process before it starts serving
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Startup(_))
    }

    /// Process exit code when the error ends the server: 1 before serving
    /// started, 2 once it was running
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() { 1 } else { 2 }
    }
}
