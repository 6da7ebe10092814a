//! `tale serve`.

use std::sync::Arc;

use anyhow::Result;
use tale_config::{Config, Purpose};
use tale_core::EventRouter;
use tale_gateway::Gateway;
use tracing::info;

use super::build_engine;
use crate::config_bridge;

/// Run the webhook gateway until Ctrl-C or SIGTERM.
pub(crate) async fn run(cfg: &Config, bind: Option<&str>, port: Option<u16>) -> Result<()> {
    cfg.require_credentials(Purpose::Serve)?;

    let addr = config_bridge::listen_addr(cfg, bind, port).await?;
    let engine = Arc::new(build_engine(cfg)?);
    let gateway = Gateway::new(
        EventRouter::new(config_bridge::to_router_settings(cfg)),
        engine,
        config_bridge::to_gateway_settings(cfg),
    );

    info!(page_id = %cfg.facebook.page_id, model = %cfg.model.model, "Starting Tale");
    gateway.serve(addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown requested");
}
