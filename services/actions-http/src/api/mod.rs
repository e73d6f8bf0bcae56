use std::sync::Arc;

use axum::extract::FromRef;

pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ActionError;
pub use router::create_router;
pub use types::*;

use crate::config::ActionsConfig;
use crate::context::ContextHydrator;

#[derive(Clone)]
pub struct ApiState {
    pub hydrator: Arc<ContextHydrator>,
    pub config: Arc<ActionsConfig>,
}

impl ApiState {
    pub fn new(config: ActionsConfig) -> anyhow::Result<Self> {
        let hydrator = ContextHydrator::new(config.crm_timeout())?;
        Ok(Self {
            hydrator: Arc::new(hydrator),
            config: Arc::new(config),
        })
    }
}

impl FromRef<ApiState> for Arc<ContextHydrator> {
    fn from_ref(state: &ApiState) -> Self {
        Arc::clone(&state.hydrator)
    }
}
