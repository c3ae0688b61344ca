//! MCP (Model Context Protocol) server implementation
//!
//! This module provides the exchange-rate MCP server using the official `rmcp`
//! SDK, served over stdio or streamable HTTP.

mod host;
mod server;

pub use host::{HostState, ServiceHost};
pub use server::{ExchangeRateService, HistoricalRatesParams, LatestRatesParams, SERVER_NAME};
