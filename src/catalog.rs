//! Tool metadata and the registry that rejects duplicate tools

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ServiceError;

pub const SUPPORTED_CURRENCIES_TOOL: &str = "get_supported_currencies";
pub const LATEST_RATES_TOOL: &str = "get_latest_exchange_rates";
pub const HISTORICAL_RATES_TOOL: &str = "get_historical_exchange_rates";

/// Tags describing the server as a whole
pub const SERVER_TAGS: &[&str] = &["frankfurtermcp", "mcp", "currency-rates"];

/// Classification tags for a tool name; empty for unknown tools
pub fn tags_for(tool_name: &str) -> &'static [&'static str] {
    match tool_name {
        SUPPORTED_CURRENCIES_TOOL => &["currency-rates", "supported-currencies"],
        LATEST_RATES_TOOL => &["currency-rates", "exchange-rates"],
        HISTORICAL_RATES_TOOL => &["currency-rates", "historical-exchange-rates"],
        _ => &[],
    }
}

/// Declared name, description and tags of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Metadata for `name` with the tags from [`tags_for`]
    pub fn tagged(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let tags = tags_for(&name);
        Self::new(name, description, tags)
    }
}

/// Registered tools, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolMetadata>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a second tool with the same name is a startup error
    pub fn register(&mut self, tool: ToolMetadata) -> Result<(), ServiceError> {
        if self.tools.contains_key(&tool.name) {
            return Err(ServiceError::Startup(format!(
                "tool '{}' is already registered",
                tool.name
            )));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolMetadata> {
        self.tools.get(name)
    }

    /// Tools in name order
    pub fn tools(&self) -> impl Iterator<Item = &ToolMetadata> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Human-readable listing of the tools and their tags
    pub fn describe(&self) -> String {
        let mut out = format!("Server tags: {}", SERVER_TAGS.join(", "));
        for tool in self.tools() {
            out.push_str(&format!(
                "\n- {} [{}]: {}",
                tool.name,
                tool.tags.join(", "),
                tool.description
            ));
        }
        out
    }
}
