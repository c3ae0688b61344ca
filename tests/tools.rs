//! Tool dispatch tests against a recorded upstream
//!
//! Run with: cargo test --test tools

use std::sync::Arc;

use frankfurter_mcp::dispatch::{self, HistoricalRequest};
use frankfurter_mcp::upstream::RecordedRequest;
use frankfurter_mcp::{FrankfurterClient, MockTransport, RateQuery, ServiceError};
use serde_json::json;

const BASE: &str = "https://api.frankfurter.test";

fn client(transport: &Arc<MockTransport>) -> FrankfurterClient {
    FrankfurterClient::new(BASE, transport.clone())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Historical path selection
// ============================================================================

#[tokio::test]
async fn test_closed_range_paths() {
    let pairs = [
        ("2024-01-01", "2024-01-31"),
        ("1999-01-04", "2000-01-04"),
        ("2023-12-29", "2024-01-02"),
    ];

    for (start, end) in pairs {
        let transport = Arc::new(MockTransport::with_json(json!({"rates": {}})));
        let request = HistoricalRequest {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..Default::default()
        };

        dispatch::historical_rates(&client(&transport), &request)
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].url,
            format!("{}/{}..{}", BASE, start, end)
        );
    }
}

#[tokio::test]
async fn test_open_range_example() {
    let transport = Arc::new(MockTransport::with_json(json!({"rates": {}})));
    let request = HistoricalRequest {
        start_date: Some("2024-01-01".to_string()),
        ..Default::default()
    };

    dispatch::historical_rates(&client(&transport), &request)
        .await
        .unwrap();
    assert_eq!(
        transport.requests(),
        vec![RecordedRequest {
            url: format!("{}/2024-01-01..", BASE),
            query: vec![],
        }]
    );
}

#[tokio::test]
async fn test_specific_date_with_filters() {
    let transport = Arc::new(MockTransport::with_json(json!({"rates": {}})));
    let request = HistoricalRequest {
        specific_date: Some("2020-03-02".to_string()),
        query: RateQuery::new(Some("CHF".to_string()), Some(strings(&["USD", "JPY"]))),
        ..Default::default()
    };

    dispatch::historical_rates(&client(&transport), &request)
        .await
        .unwrap();
    let sent = &transport.requests()[0];
    assert_eq!(sent.url, format!("{}/2020-03-02", BASE));
    assert_eq!(
        sent.query,
        vec![
            ("base".to_string(), "CHF".to_string()),
            ("symbols".to_string(), "USD,JPY".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_missing_dates_never_reach_upstream() {
    let transport = Arc::new(MockTransport::with_json(json!({})));
    let request = HistoricalRequest {
        query: RateQuery::new(Some("USD".to_string()), Some(strings(&["EUR"]))),
        ..Default::default()
    };

    let err = dispatch::historical_rates(&client(&transport), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(err.to_string().contains("specific date, a start date, or a date range"));
    assert!(transport.requests().is_empty());
}

// ============================================================================
// Latest rates and currencies
// ============================================================================

#[tokio::test]
async fn test_latest_rates_example() {
    let body = json!({
        "amount": 1.0,
        "base": "USD",
        "date": "2024-05-03",
        "rates": {"EUR": 0.92901, "GBP": 0.79693}
    });
    let transport = Arc::new(MockTransport::with_json(body.clone()));
    let query = RateQuery::new(Some("USD".to_string()), Some(strings(&["EUR", "GBP"])));

    let value = dispatch::latest_rates(&client(&transport), &query)
        .await
        .unwrap();
    assert_eq!(value, body);
    assert_eq!(
        transport.requests(),
        vec![RecordedRequest {
            url: format!("{}/latest", BASE),
            query: vec![
                ("base".to_string(), "USD".to_string()),
                ("symbols".to_string(), "EUR,GBP".to_string()),
            ],
        }]
    );
}

#[tokio::test]
async fn test_empty_symbols_are_omitted() {
    let transport = Arc::new(MockTransport::with_json(json!({"rates": {}})));
    let query = RateQuery::new(None, Some(vec![]));

    dispatch::latest_rates(&client(&transport), &query)
        .await
        .unwrap();
    assert!(transport.requests()[0].query.is_empty());
}

#[tokio::test]
async fn test_currencies_pass_through() {
    let body = json!({"AUD": "Australian Dollar", "EUR": "Euro"});
    let transport = Arc::new(MockTransport::with_json(body.clone()));

    let value = dispatch::list_currencies(&client(&transport)).await.unwrap();
    assert_eq!(value, body);
}

#[tokio::test]
async fn test_upstream_errors_are_per_call() {
    let transport = Arc::new(MockTransport::with_body("Service Unavailable"));
    let err = dispatch::list_currencies(&client(&transport))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));

    let transport = Arc::new(MockTransport::unreachable());
    let err = dispatch::latest_rates(&client(&transport), &RateQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
    assert!(!err.is_fatal());
}
