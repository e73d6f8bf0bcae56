use agent_actions_crm::CrmError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientContextError {
    #[error("x-client-context header is not valid base64: {0}")]
    Decoding(String),

    #[error("x-client-context header is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required field {field} in x-client-context")]
    Validation { field: &'static str },

    #[error("Failed to initialize CRM connection: {0}")]
    Connection(#[from] CrmError),
}

impl From<base64::DecodeError> for ClientContextError {
    fn from(err: base64::DecodeError) -> Self {
        ClientContextError::Decoding(err.to_string())
    }
}

impl ClientContextError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientContextError::Decoding(_) => "CLIENT_CONTEXT_DECODING_ERROR",
            ClientContextError::Parse(_) => "CLIENT_CONTEXT_PARSE_ERROR",
            ClientContextError::Validation { .. } => "CLIENT_CONTEXT_VALIDATION_ERROR",
            ClientContextError::Connection(_) => "CLIENT_CONTEXT_CONNECTION_ERROR",
        }
    }

    /// Caller-safe detail. Only the name of a missing field is exposed.
    pub fn details(&self) -> Option<Value> {
        match self {
            ClientContextError::Validation { field } => Some(json!({ "field": field })),
            _ => None,
        }
    }
}
