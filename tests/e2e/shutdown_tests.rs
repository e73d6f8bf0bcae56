use std::time::Duration;

use super::TestHarness;
use agent_actions_http::ActionsConfig;
use anyhow::Result;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_crm_is_reported_unavailable() -> Result<()> {
    let mut harness = TestHarness::start_with(ActionsConfig {
        crm_timeout_secs: 1,
        request_timeout_secs: 5,
        ..ActionsConfig::default()
    })
    .await?;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "totalSize": 0, "done": true, "records": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(harness.crm())
        .await;

    let context = harness.client_context();
    let response = harness
        .post_action(
            "calculateCarbonFootprint",
            &json!({ "flightId": "a01SLOW" }),
            Some(&context),
        )
        .await?;
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    harness.shutdown().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_stops_on_shutdown() -> Result<()> {
    let mut harness = TestHarness::start().await?;
    let health = harness.url("/health");

    let response = harness.http_client().get(&health).send().await?;
    assert_eq!(response.status(), 200);

    harness.shutdown().await?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;
    assert!(client.get(&health).send().await.is_err());
    Ok(())
}
