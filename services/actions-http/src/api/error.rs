use agent_actions_crm::CrmError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use super::types::ErrorResponse;
use crate::actions::FinanceError;
use crate::context::ClientContextError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    NotFound(String),

    /// Carries a caller-safe message; the cause is logged where it occurs.
    #[error("{0}")]
    Internal(String),

    /// The cause is logged by the extractor, never returned.
    #[error("Error processing x-client-context header.")]
    ClientContext(#[from] ClientContextError),
}

impl ActionError {
    pub fn crm_unavailable() -> Self {
        ActionError::ServiceUnavailable("CRM connection is not available.".to_string())
    }

    pub fn unexpected<E: std::fmt::Display>(err: E) -> Self {
        error!(error = %err, "action failed unexpectedly");
        ActionError::Internal("An unexpected error occurred.".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ActionError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::Internal(_) | ActionError::ClientContext(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ActionError::ClientContext(e) => e.details(),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ActionError::BadRequest(_) => "BAD_REQUEST",
            ActionError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ActionError::NotFound(_) => "NOT_FOUND",
            ActionError::Internal(_) => "INTERNAL_ERROR",
            ActionError::ClientContext(e) => e.code(),
        }
    }
}

impl From<CrmError> for ActionError {
    fn from(err: CrmError) -> Self {
        if err.is_connection_failure() {
            warn!(error = %err, "CRM connection failure");
            ActionError::ServiceUnavailable("Failed to connect to the CRM.".to_string())
        } else {
            ActionError::unexpected(err)
        }
    }
}

impl From<FinanceError> for ActionError {
    fn from(err: FinanceError) -> Self {
        ActionError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        ActionError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            details: self.details(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
