use std::sync::Arc;
use std::time::Duration;

use agent_actions_crm::{CrmClient, CrmSession};
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use http::HeaderValue;
use reqwest::Client;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::{ClientContextError, SessionContext, CLIENT_CONTEXT_HEADER};
use crate::api::ActionError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClientContext {
    #[serde(default, deserialize_with = "lenient_string")]
    access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    api_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    namespace: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org_domain_url: Option<String>,
    user_context: Option<RawUserContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserContext {
    #[serde(default, deserialize_with = "lenient_string")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    username: Option<String>,
}

/// Scalar context fields are read as text whether the caller sent a
/// string, a number or a boolean.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(D::Error::custom("expected a string, number or boolean")),
    }
}

/// CRM availability for the current request.
#[derive(Debug)]
pub enum CrmConnection {
    Present(CrmClient),
    Absent,
}

impl CrmConnection {
    pub fn is_present(&self) -> bool {
        matches!(self, CrmConnection::Present(_))
    }
}

/// Per-request context handed to every action handler.
///
/// Dropping the context cancels any CRM call still running on its behalf,
/// which covers both handler completion and router timeouts.
#[derive(Debug)]
pub struct ClientContext {
    pub session: Option<SessionContext>,
    pub crm: CrmConnection,
    _cancel_guard: DropGuard,
}

impl ClientContext {
    pub fn absent() -> Self {
        Self {
            session: None,
            crm: CrmConnection::Absent,
            _cancel_guard: CancellationToken::new().drop_guard(),
        }
    }

    fn hydrated(session: SessionContext, crm: CrmClient, cancel: CancellationToken) -> Self {
        Self {
            session: Some(session),
            crm: CrmConnection::Present(crm.with_cancellation(cancel.clone())),
            _cancel_guard: cancel.drop_guard(),
        }
    }
}

/// Turns the encoded client context header into a [`ClientContext`].
pub struct ContextHydrator {
    http_client: Client,
    crm_timeout: Duration,
}

impl ContextHydrator {
    pub fn new(crm_timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(crm_timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http_client,
            crm_timeout,
        })
    }

    pub fn hydrate(&self, header: Option<&HeaderValue>) -> Result<ClientContext, ClientContextError> {
        let Some(header) = header else {
            debug!("No client context header, CRM unavailable for this request");
            return Ok(ClientContext::absent());
        };

        let encoded = header
            .to_str()
            .map_err(|e| ClientContextError::Decoding(e.to_string()))?;
        let session = decode_client_context(encoded)?;

        let crm = CrmClient::with_http_client(
            self.http_client.clone(),
            CrmSession {
                access_token: session.access_token.clone(),
                api_version: session.api_version.clone(),
                org_domain_url: session.org_domain_url.clone(),
                username: session.username.clone(),
            },
            self.crm_timeout,
        )?;

        info!(
            org_id = %session.org_id,
            user_id = %session.user_id,
            request_id = %session.request_id,
            endpoint = %crm.service_endpoint(),
            "Hydrated client context"
        );

        Ok(ClientContext::hydrated(
            session,
            crm,
            CancellationToken::new(),
        ))
    }
}

/// Decode and validate the base64 JSON client context.
pub fn decode_client_context(encoded: &str) -> Result<SessionContext, ClientContextError> {
    let encoded = encoded.trim();
    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| STANDARD_NO_PAD.decode(encoded.trim_end_matches('=')))?;

    let raw: RawClientContext = serde_json::from_slice(&bytes)?;
    let user = raw.user_context.unwrap_or_default();

    let session = SessionContext {
        access_token: required("accessToken", raw.access_token)?,
        api_version: required("apiVersion", raw.api_version)?,
        org_domain_url: required("orgDomainUrl", raw.org_domain_url)?,
        user_id: required("userContext.userId", user.user_id)?,
        username: required("userContext.username", user.username)?,
        request_id: raw.request_id.unwrap_or_default(),
        namespace: raw.namespace.unwrap_or_default(),
        org_id: raw.org_id.unwrap_or_default(),
    };

    Ok(session)
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ClientContextError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            warn!(field, "Client context is missing a required field");
            Err(ClientContextError::Validation { field })
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
    Arc<ContextHydrator>: FromRef<S>,
{
    type Rejection = ActionError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let hydrator = Arc::<ContextHydrator>::from_ref(state);
        hydrator
            .hydrate(parts.headers.get(CLIENT_CONTEXT_HEADER))
            .map_err(|err| {
                warn!(error = %err, "Rejecting request with invalid client context");
                ActionError::ClientContext(err)
            })
    }
}
