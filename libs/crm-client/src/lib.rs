//! Read-only access to the CRM backing the agent actions.
//!
//! Queries are expressed as SOQL and executed against the org's REST query
//! resource using the session token handed to us by the calling platform.

mod client;
mod error;
mod record;
pub mod soql;

pub use client::{CrmClient, CrmSession, MAX_QUERY_PAGES};
pub use error::CrmError;
pub use record::{CrmRecord, QueryResult, RecordAttributes};
pub use soql::SoqlQuery;
