use std::time::{Duration, Instant};

use agent_actions_http::{ActionsConfig, ActionsServer, CLIENT_CONTEXT_HEADER};
use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_VERSION: &str = "62.0";

/// Encoded `x-client-context` header value for a session on `org_domain_url`.
pub fn encode_client_context(org_domain_url: &str, access_token: &str) -> String {
    STANDARD.encode(
        json!({
            "accessToken": access_token,
            "apiVersion": API_VERSION,
            "requestId": "e2e-request",
            "namespace": "",
            "orgId": "00D000000000001AAA",
            "orgDomainUrl": org_domain_url,
            "userContext": {
                "userId": "005000000000001AAA",
                "username": "agent@actions.test"
            }
        })
        .to_string(),
    )
}

/// Body of a single-page CRM query response.
pub fn query_response(records: Vec<Value>) -> Value {
    json!({
        "totalSize": records.len(),
        "done": true,
        "records": records
    })
}

/// One actions server bound to an ephemeral port, talking to a mocked CRM.
pub struct TestHarness {
    port: u16,
    crm: MockServer,
    http_client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<Result<()>>>,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        Self::start_with(ActionsConfig::default()).await
    }

    pub async fn start_with(config: ActionsConfig) -> Result<Self> {
        tracing_subscriber::fmt::try_init().ok();

        let crm = MockServer::start().await;
        let port = find_free_port()?;
        let config = ActionsConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..config
        };
        config.validate().context("validating harness config")?;

        let server = ActionsServer::new(config).context("building actions server")?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async {
            shutdown_rx.await.ok();
        }));

        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building reqwest client")?;

        let harness = Self {
            port,
            crm,
            http_client,
            shutdown: Some(shutdown_tx),
            server: Some(handle),
        };
        harness
            .wait_for_service_health(Duration::from_secs(10))
            .await
            .context("waiting for actions server health")?;
        info!(port, "Actions server ready");
        Ok(harness)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn crm(&self) -> &MockServer {
        &self.crm
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Client context whose org points at the mocked CRM.
    pub fn client_context(&self) -> String {
        encode_client_context(&self.crm.uri(), "e2e-access-token")
    }

    /// Answer `soql` with `records` on the CRM query resource.
    pub async fn mock_query(&self, soql: &str, records: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/services/data/v{}/query", API_VERSION)))
            .and(query_param("q", soql))
            .respond_with(ResponseTemplate::new(200).set_body_json(query_response(records)))
            .mount(&self.crm)
            .await;
    }

    pub async fn post_action(
        &self,
        action: &str,
        body: &Value,
        client_context: Option<&str>,
    ) -> Result<Response> {
        let mut request = self
            .http_client
            .post(self.url(&format!("/api/{}", action)))
            .json(body);
        if let Some(context) = client_context {
            request = request.header(CLIENT_CONTEXT_HEADER, context);
        }
        request
            .send()
            .await
            .with_context(|| format!("posting to {}", action))
    }

    pub async fn wait_for_service_health(&self, timeout: Duration) -> Result<()> {
        let url = self.url("/health");
        let start = Instant::now();
        while start.elapsed() < timeout {
            match self.http_client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    debug!("health check for {url} returned {}", response.status());
                }
                Err(err) => {
                    debug!("health check for {url} failed: {err}");
                }
            };
            sleep(Duration::from_millis(50)).await;
        }
        Err(anyhow!("timeout waiting for service health at {url}"))
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.server.take() {
            match handle.await {
                Ok(result) => result?,
                Err(err) => error!("actions server task failed: {err}"),
            }
        }
        Ok(())
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

pub fn find_free_port() -> Result<u16> {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .context("binding to ephemeral port")?
        .local_addr()
        .context("reading socket address")?
        .port();
    Ok(port)
}
