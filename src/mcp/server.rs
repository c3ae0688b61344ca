//! MCP Server implementation using the official rmcp SDK
//!
//! Exposes the Frankfurter exchange-rate tools via the Model Context Protocol.

use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{ToolCatalog, ToolMetadata};
use crate::dispatch::{self, HistoricalRequest};
use crate::types::{RateQuery, ServiceError};
use crate::upstream::FrankfurterClient;

/// Name the server reports to clients
pub const SERVER_NAME: &str = "frankfurter-mcp";

// ============================================================================
// Request Types
// ============================================================================

/// Parameters for the get_latest_exchange_rates tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LatestRatesParams {
    /// Base currency code; the upstream defaults to EUR
    #[serde(default)]
    #[schemars(description = "Base currency code, e.g. USD. Defaults to EUR")]
    pub base_currency: Option<String>,
    /// Currencies to include; all when omitted
    #[serde(default)]
    #[schemars(description = "Currency codes to include. All currencies when omitted")]
    pub symbols: Option<Vec<String>>,
}

impl From<LatestRatesParams> for RateQuery {
    fn from(p: LatestRatesParams) -> Self {
        RateQuery::new(p.base_currency, p.symbols)
    }
}

/// Parameters for the get_historical_exchange_rates tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HistoricalRatesParams {
    /// Single day, YYYY-MM-DD
    #[serde(default)]
    #[schemars(description = "A single date (YYYY-MM-DD)")]
    pub specific_date: Option<String>,
    /// First day of a range, YYYY-MM-DD
    #[serde(default)]
    #[schemars(
        description = "Start of a date range (YYYY-MM-DD). Without end_date the range runs to the latest available date"
    )]
    pub start_date: Option<String>,
    /// Last day of a range, YYYY-MM-DD
    #[serde(default)]
    #[schemars(
        description = "End of a date range (YYYY-MM-DD). Only used together with start_date"
    )]
    pub end_date: Option<String>,
    /// Base currency code; the upstream defaults to EUR
    #[serde(default)]
    #[schemars(description = "Base currency code, e.g. USD. Defaults to EUR")]
    pub base_currency: Option<String>,
    /// Currencies to include; all when omitted
    #[serde(default)]
    #[schemars(description = "Currency codes to include. All currencies when omitted")]
    pub symbols: Option<Vec<String>>,
}

impl From<HistoricalRatesParams> for HistoricalRequest {
    fn from(p: HistoricalRatesParams) -> Self {
        HistoricalRequest {
            specific_date: p.specific_date,
            start_date: p.start_date,
            end_date: p.end_date,
            query: RateQuery::new(p.base_currency, p.symbols),
        }
    }
}

// ============================================================================
// MCP Service
// ============================================================================

/// Frankfurter exchange-rate MCP service
///
/// Stateless apart from the upstream client; clones share it.
#[derive(Clone, Debug)]
pub struct ExchangeRateService {
    /// Upstream API client
    client: FrankfurterClient,
    /// Metadata of every registered tool
    catalog: Arc<ToolCatalog>,
    /// Tool router for rmcp
    tool_router: ToolRouter<Self>,
}

impl ExchangeRateService {
    /// Register all tools against `client`
    pub fn new(client: FrankfurterClient) -> Result<Self, ServiceError> {
        Self::with_routers(client, Self::routers())
    }

    /// Tool groups served by default
    pub(crate) fn routers() -> Vec<ToolRouter<Self>> {
        vec![Self::currency_router(), Self::rates_router()]
    }

    /// Merge `routers` into one, failing on the first duplicate tool name
    pub(crate) fn with_routers(
        client: FrankfurterClient,
        routers: Vec<ToolRouter<Self>>,
    ) -> Result<Self, ServiceError> {
        let mut catalog = ToolCatalog::new();
        let mut tool_router = ToolRouter::new();

        for router in routers {
            for tool in router.list_all() {
                let description = tool.description.as_deref().unwrap_or_default();
                catalog.register(ToolMetadata::tagged(tool.name.to_string(), description))?;
                debug!(tool = %tool.name, "registered tool");
            }
            tool_router.merge(router);
        }

        Ok(Self {
            client,
            catalog: Arc::new(catalog),
            tool_router,
        })
    }

    /// Registered tool metadata
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }
}

/// Successful payloads become JSON content; failures become an error result
/// the calling agent can read.
fn tool_result(outcome: Result<Value, ServiceError>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => {
            warn!(error = %e, "tool invocation failed");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

#[tool_router(router = currency_router)]
impl ExchangeRateService {
    /// Returns the currencies the upstream supports
    #[tool(description = "Get supported currencies")]
    async fn get_supported_currencies(&self) -> Result<CallToolResult, McpError> {
        tool_result(dispatch::list_currencies(&self.client).await)
    }
}

#[tool_router(router = rates_router)]
impl ExchangeRateService {
    /// Returns the latest rates for a base currency.
    ///
    /// Without a base currency the upstream uses EUR; without symbols every
    /// available currency is returned.
    #[tool(
        description = "Get latest exchange rates in specific currencies for a given base currency"
    )]
    async fn get_latest_exchange_rates(
        &self,
        Parameters(params): Parameters<LatestRatesParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = RateQuery::from(params);
        tool_result(dispatch::latest_rates(&self.client, &query).await)
    }

    /// Returns rates for a specific date or a date range
    #[tool(
        description = "Get historical exchange rates for a specific date or date range in specific currencies for a given base currency"
    )]
    async fn get_historical_exchange_rates(
        &self,
        Parameters(params): Parameters<HistoricalRatesParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = HistoricalRequest::from(params);
        tool_result(dispatch::historical_rates(&self.client, &request).await)
    }
}

#[tool_handler]
impl ServerHandler for ExchangeRateService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Frankfurter MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Currency exchange rates from the Frankfurter API.\n{}",
                self.catalog.describe()
            )),
        }
    }
}
