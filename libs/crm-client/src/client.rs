use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{CrmError, QueryResult, SoqlQuery};

const SOAP_PARTNER_PATH: &str = "/services/Soap/u/";
const REST_DATA_PATH: &str = "/services/data/v";

/// Upper bound on continuation pages fetched for one query.
pub const MAX_QUERY_PAGES: usize = 50;

/// Credentials and addressing for one authenticated CRM session.
#[derive(Clone)]
pub struct CrmSession {
    pub access_token: String,
    pub api_version: String,
    pub org_domain_url: String,
    pub username: String,
}

impl fmt::Debug for CrmSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmSession")
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("org_domain_url", &self.org_domain_url)
            .field("username", &self.username)
            .finish()
    }
}

/// An authenticated, request-scoped handle for issuing read queries.
///
/// Building a handle performs no I/O. The underlying connection pool may be
/// shared, but every handle carries its own session and cancellation token.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http_client: Client,
    session: CrmSession,
    instance_url: Url,
    service_endpoint: String,
    query_endpoint: Url,
    timeout: Duration,
    cancel: CancellationToken,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrmErrorBody {
    message: String,
    error_code: String,
}

impl CrmClient {
    pub fn new(session: CrmSession, timeout: Duration) -> Result<Self, CrmError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| CrmError::InvalidEndpoint(format!("failed to build HTTP client: {}", e)))?;

        Self::with_http_client(http_client, session, timeout)
    }

    pub fn with_http_client(
        http_client: Client,
        mut session: CrmSession,
        timeout: Duration,
    ) -> Result<Self, CrmError> {
        session.org_domain_url = session.org_domain_url.trim_end_matches('/').to_string();

        let instance_url = Url::parse(&session.org_domain_url).map_err(|e| {
            CrmError::InvalidEndpoint(format!("{}: {}", session.org_domain_url, e))
        })?;
        if !matches!(instance_url.scheme(), "http" | "https") {
            return Err(CrmError::InvalidEndpoint(format!(
                "unsupported scheme in {}",
                session.org_domain_url
            )));
        }

        let service_endpoint = format!(
            "{}{}{}",
            session.org_domain_url, SOAP_PARTNER_PATH, session.api_version
        );

        let query_endpoint = Url::parse(&format!(
            "{}{}{}/query",
            session.org_domain_url,
            REST_DATA_PATH,
            rest_api_version(&session.api_version)
        ))
        .map_err(|e| CrmError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            http_client,
            session,
            instance_url,
            service_endpoint,
            query_endpoint,
            timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// Bind the handle to a caller-owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn session(&self) -> &CrmSession {
        &self.session
    }

    /// Versioned partner service endpoint for this session.
    pub fn service_endpoint(&self) -> &str {
        &self.service_endpoint
    }

    pub fn query_endpoint(&self) -> &Url {
        &self.query_endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a query and collect every page of results.
    #[instrument(skip(self, query), fields(object = %query.object()))]
    pub async fn query(&self, query: &SoqlQuery) -> Result<QueryResult, CrmError> {
        let soql = query.to_string();
        debug!(soql = %soql, "Running CRM query");

        let start = Instant::now();
        let mut result = self.fetch_page(self.query_endpoint.clone(), Some(&soql)).await?;
        let mut pages = 1;

        while !result.done {
            if pages >= MAX_QUERY_PAGES {
                warn!(pages, "CRM query exceeded the page limit");
                return Err(CrmError::InvalidResponse(format!(
                    "query did not complete within {} pages",
                    MAX_QUERY_PAGES
                )));
            }
            let Some(next) = result.next_records_url.take() else {
                warn!("CRM reported more records without a continuation URL");
                break;
            };
            let url = self
                .instance_url
                .join(&next)
                .map_err(|e| CrmError::InvalidResponse(format!("bad nextRecordsUrl: {}", e)))?;

            let page = self.fetch_page(url, None).await?;
            pages += 1;
            result.records.extend(page.records);
            result.done = page.done;
            result.next_records_url = page.next_records_url;
        }

        info!(
            records = result.records.len(),
            latency_ms = start.elapsed().as_millis(),
            "CRM query completed"
        );

        Ok(result)
    }

    async fn fetch_page(&self, url: Url, soql: Option<&str>) -> Result<QueryResult, CrmError> {
        if self.cancel.is_cancelled() {
            return Err(CrmError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CrmError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.send(url, soql)) => {
                result.map_err(|_| CrmError::Timeout)?
            }
        }
    }

    async fn send(&self, url: Url, soql: Option<&str>) -> Result<QueryResult, CrmError> {
        let mut request = self
            .http_client
            .get(url)
            .bearer_auth(&self.session.access_token)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);

        if let Some(soql) = soql {
            request = request.query(&[("q", soql)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return response.json::<QueryResult>().await.map_err(|e| {
                CrmError::InvalidResponse(format!("Failed to parse query response: {}", e))
            });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());

        Err(rejection(status, &body))
    }
}

fn rejection(status: StatusCode, body: &str) -> CrmError {
    let parsed = serde_json::from_str::<Vec<CrmErrorBody>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next());

    let (error_code, message) = match parsed {
        Some(err) => (err.error_code, err.message),
        None if status == StatusCode::UNAUTHORIZED => (
            "INVALID_SESSION_ID".to_string(),
            "Session expired or invalid".to_string(),
        ),
        None => ("UNKNOWN_ERROR".to_string(), body.to_string()),
    };

    warn!(status = %status, error_code = %error_code, "CRM rejected query");

    CrmError::Rejected {
        status,
        error_code,
        message,
    }
}

/// The REST data resource is addressed as `vNN.N`.
fn rest_api_version(api_version: &str) -> String {
    let version = api_version.trim().trim_start_matches(['v', 'V']);
    if version.contains('.') {
        version.to_string()
    } else {
        format!("{}.0", version)
    }
}
