//! Exchange-rate tool operations
//!
//! Each operation turns caller parameters into one upstream request and
//! hands the decoded JSON back untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DateSpec, RateQuery, ServiceError};
use crate::upstream::FrankfurterClient;

/// Upstream path listing the supported currencies
pub const CURRENCIES_PATH: &str = "/currencies";
/// Upstream path for the most recent rates
pub const LATEST_PATH: &str = "/latest";

/// Inputs of a historical lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRequest {
    pub specific_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub query: RateQuery,
}

impl HistoricalRequest {
    /// Date form governing this request
    pub fn date_spec(&self) -> Result<DateSpec, ServiceError> {
        DateSpec::from_fields(
            self.specific_date.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }
}

/// Currencies the upstream knows about
pub async fn list_currencies(client: &FrankfurterClient) -> Result<Value, ServiceError> {
    client.get(CURRENCIES_PATH, &Vec::new()).await
}

/// Latest rates, optionally rebased and filtered to `query.symbols`
pub async fn latest_rates(
    client: &FrankfurterClient,
    query: &RateQuery,
) -> Result<Value, ServiceError> {
    client.get(LATEST_PATH, &query.to_params()).await
}

/// Rates for a past day or a date range.
///
/// Fails with [`ServiceError::Validation`] before any request is made when
/// no date field is given.
pub async fn historical_rates(
    client: &FrankfurterClient,
    request: &HistoricalRequest,
) -> Result<Value, ServiceError> {
    let spec = request.date_spec()?;
    client.get(&spec.path(), &request.query.to_params()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    const BASE: &str = "https://api.example.test";

    fn setup(body: Value) -> (Arc<MockTransport>, FrankfurterClient) {
        let transport = Arc::new(MockTransport::with_json(body));
        let client = FrankfurterClient::new(BASE, transport.clone());
        (transport, client)
    }

    #[tokio::test]
    async fn test_list_currencies() {
        let body = json!({"EUR": "Euro", "USD": "United States Dollar"});
        let (transport, client) = setup(body.clone());

        assert_eq!(list_currencies(&client).await.unwrap(), body);
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.example.test/currencies");
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_latest_rates_defaults() {
        let (transport, client) = setup(json!({"base": "EUR", "rates": {}}));

        latest_rates(&client, &RateQuery::default()).await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.example.test/latest");
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_historical_open_range_sends_no_params() {
        let (transport, client) = setup(json!({"rates": {}}));
        let request = HistoricalRequest {
            start_date: Some("2024-01-01".to_string()),
            ..Default::default()
        };

        historical_rates(&client, &request).await.unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.example.test/2024-01-01..");
        assert!(requests[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_historical_without_dates_makes_no_request() {
        let (transport, client) = setup(json!({}));
        let request = HistoricalRequest {
            end_date: Some("2024-01-31".to_string()),
            query: RateQuery::new(Some("USD".to_string()), None),
            ..Default::default()
        };

        let err = historical_rates(&client, &request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_historical_request_deserializes_flat() {
        let request: HistoricalRequest = serde_json::from_value(json!({
            "specific_date": "2023-06-15",
            "base_currency": "GBP",
            "symbols": ["USD"]
        }))
        .unwrap();

        assert_eq!(request.specific_date.as_deref(), Some("2023-06-15"));
        assert_eq!(request.query.base_currency.as_deref(), Some("GBP"));
        assert_eq!(request.date_spec().unwrap().path(), "/2023-06-15");
    }
}
