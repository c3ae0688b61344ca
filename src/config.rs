//! Environment-driven server configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ServiceError;

/// Base URL of the Frankfurter API
pub const FRANKFURTER_API_URL: &str = "FRANKFURTER_API_URL";
/// Transport the server accepts requests on
pub const MCP_SERVER_TRANSPORT: &str = "MCP_SERVER_TRANSPORT";
/// Bind host for the HTTP transports, an IP address or a hostname
pub const MCP_SERVER_HOST: &str = "FASTMCP_HOST";
/// Bind port for the HTTP transports
pub const MCP_SERVER_PORT: &str = "FASTMCP_PORT";
/// Optional timeout for upstream requests, in milliseconds
pub const FRANKFURTER_API_TIMEOUT_MS: &str = "FRANKFURTER_API_TIMEOUT_MS";

pub const DEFAULT_API_URL: &str = "https://api.frankfurter.app";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Ways the server can receive tool invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// MCP streamable HTTP, served under `/mcp`
    StreamableHttp,
    /// Legacy HTTP with server-sent events, `/sse` plus `/message`
    Sse,
}

impl TransportKind {
    pub const ALL: [TransportKind; 3] = [
        TransportKind::Stdio,
        TransportKind::StreamableHttp,
        TransportKind::Sse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::StreamableHttp => "streamable-http",
            Self::Sse => "sse",
        }
    }

    /// Names accepted in `MCP_SERVER_TRANSPORT`
    pub fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(TransportKind::as_str).collect()
    }
}

impl FromStr for TransportKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ServiceError::Configuration {
                name: MCP_SERVER_TRANSPORT.to_string(),
                value: s.to_string(),
                allowed: Self::allowed_values().into_iter().map(String::from).collect(),
            })
    }
}

/// Read `name` from the process environment.
///
/// Returns the value when it is set and, if `allowed` is given, listed in
/// it; the default when unset; a configuration error otherwise.
pub fn resolve(
    name: &str,
    default: Option<&str>,
    allowed: Option<&[&str]>,
) -> Result<Option<String>, ServiceError> {
    resolve_with(|key| std::env::var(key).ok(), name, default, allowed)
}

/// Same as [`resolve`], reading values through `lookup`
pub fn resolve_with<F>(
    lookup: F,
    name: &str,
    default: Option<&str>,
    allowed: Option<&[&str]>,
) -> Result<Option<String>, ServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(default.map(String::from));
    };

    match allowed {
        Some(allowed) if !allowed.contains(&value.as_str()) => Err(ServiceError::Configuration {
            name: name.to_string(),
            value,
            allowed: allowed.iter().map(|v| v.to_string()).collect(),
        }),
        _ => Ok(Some(value)),
    }
}

/// Immutable configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL every upstream path is appended to
    pub api_url: String,
    pub transport: TransportKind,
    /// Listen host when serving over HTTP; resolved when the host binds
    pub host: String,
    /// Listen port when serving over HTTP
    pub port: u16,
    /// Upstream request timeout; `None` waits indefinitely
    pub api_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            transport: TransportKind::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the configuration from the process environment
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = resolve_with(&lookup, FRANKFURTER_API_URL, Some(DEFAULT_API_URL), None)?
            .unwrap_or(defaults.api_url);

        let allowed = TransportKind::allowed_values();
        let transport = match resolve_with(
            &lookup,
            MCP_SERVER_TRANSPORT,
            Some(defaults.transport.as_str()),
            Some(allowed.as_slice()),
        )? {
            Some(value) => value.parse()?,
            None => defaults.transport,
        };

        let host = match resolve_with(&lookup, MCP_SERVER_HOST, Some(DEFAULT_HOST), None)? {
            Some(value) if !value.trim().is_empty() => value,
            Some(value) => {
                return Err(ServiceError::Configuration {
                    name: MCP_SERVER_HOST.to_string(),
                    value,
                    allowed: vec!["an IP address or hostname".to_string()],
                });
            }
            None => defaults.host,
        };
        let port = match resolve_with(&lookup, MCP_SERVER_PORT, None, None)? {
            Some(value) => parse_value(MCP_SERVER_PORT, &value, "a port number (0-65535)")?,
            None => DEFAULT_PORT,
        };

        let api_timeout_ms = match resolve_with(&lookup, FRANKFURTER_API_TIMEOUT_MS, None, None)? {
            Some(value) => match parse_value::<u64>(
                FRANKFURTER_API_TIMEOUT_MS,
                &value,
                "a positive number of milliseconds",
            )? {
                0 => {
                    return Err(ServiceError::Configuration {
                        name: FRANKFURTER_API_TIMEOUT_MS.to_string(),
                        value,
                        allowed: vec!["a positive number of milliseconds".to_string()],
                    });
                }
                ms => Some(ms),
            },
            None => None,
        };

        Ok(Self {
            api_url,
            transport,
            host,
            port,
            api_timeout_ms,
        })
    }

    /// Builder: set the upstream base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Builder: set the transport
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Builder: set the HTTP listen host and port
    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Builder: set the upstream timeout
    pub fn with_api_timeout_ms(mut self, timeout: u64) -> Self {
        self.api_timeout_ms = Some(timeout);
        self
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str, expected: &str) -> Result<T, ServiceError> {
    value.parse().map_err(|_| ServiceError::Configuration {
        name: name.to_string(),
        value: value.to_string(),
        allowed: vec![expected.to_string()],
    })
}
