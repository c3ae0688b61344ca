//! Frankfurter MCP - currency exchange rates as tools for AI agents
//!
//! Proxies the [Frankfurter](https://www.frankfurter.app) exchange-rate API
//! through the Model Context Protocol. Three tools are exposed:
//!
//! - **`get_supported_currencies`** - currencies the API knows about
//! - **`get_latest_exchange_rates`** - latest rates for a base currency
//! - **`get_historical_exchange_rates`** - rates for a day or a date range
//!
//! Responses are passed through as JSON without reshaping.
//!
//! ## Features
//!
//! - **`mcp-server`** (default) - rmcp service, stdio/HTTP transports and the
//!   `frankfurter-mcp` binary
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use frankfurter_mcp::{dispatch, FrankfurterClient, RateQuery, ReqwestTransport};
//!
//! let client = FrankfurterClient::new("https://api.frankfurter.app", Arc::new(ReqwestTransport::new()));
//! let query = RateQuery::new(Some("USD".into()), Some(vec!["EUR".into(), "GBP".into()]));
//!
//! // GET https://api.frankfurter.app/latest?base=USD&symbols=EUR,GBP
//! let rates = dispatch::latest_rates(&client, &query).await?;
//! ```

// Core modules (always available)
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod types;
pub mod upstream;

// Re-export core types
pub use catalog::{ToolCatalog, ToolMetadata};
pub use config::{ServerConfig, TransportKind};
pub use dispatch::HistoricalRequest;
pub use types::{DateSpec, QueryParams, RateQuery, ServiceError};
pub use upstream::{FrankfurterClient, HttpTransport, MockTransport, ReqwestTransport};

// MCP server (only when mcp-server feature is enabled)
#[cfg(feature = "mcp-server")]
pub mod mcp;
