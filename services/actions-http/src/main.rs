use agent_actions_http::config::{ActionsConfig, LogFormat};
use agent_actions_http::server::ActionsServer;
use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ActionsConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log_level, config.log_format);

    info!("agent-actions-http service starting");
    info!(
        "Configuration loaded: listen={}, crm_timeout={}s, request_timeout={}s",
        config.listen_addr(),
        config.crm_timeout_secs,
        config.request_timeout_secs
    );

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    let server = ActionsServer::new(config).context("Failed to create actions server")?;

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        return Err(e);
    }

    info!("agent-actions-http service stopped");
    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    match format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Compact => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_line_number(true)
            .compact()
            .init(),
    }
}
