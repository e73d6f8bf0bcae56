pub mod actions;
pub mod api;
pub mod config;
pub mod context;
pub mod server;

pub use api::{create_router, ActionError, ApiState};
pub use config::ActionsConfig;
pub use context::{ClientContext, CrmConnection, SessionContext, CLIENT_CONTEXT_HEADER};
pub use server::ActionsServer;
