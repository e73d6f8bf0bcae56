use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Invalid CRM endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("CRM service unreachable: {0}")]
    Unavailable(String),

    #[error("CRM request timed out")]
    Timeout,

    #[error("CRM request cancelled")]
    Cancelled,

    #[error("CRM rejected request (status {status}, {error_code}): {message}")]
    Rejected {
        status: StatusCode,
        error_code: String,
        message: String,
    },

    #[error("Invalid response from CRM: {0}")]
    InvalidResponse(String),

    #[error("Record {object} is missing field {field}")]
    MissingField { object: String, field: String },

    #[error("Invalid SOQL: {0}")]
    InvalidQuery(String),
}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CrmError::Timeout
        } else if err.is_decode() {
            CrmError::InvalidResponse(err.to_string())
        } else {
            CrmError::Unavailable(err.to_string())
        }
    }
}

impl CrmError {
    /// Whether the failure happened at the connection level rather than in
    /// the CRM's handling of the query.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            CrmError::Unavailable(_) | CrmError::Timeout | CrmError::Cancelled
        )
    }
}
