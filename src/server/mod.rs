//! HTTP webhook surface for the chat platform.
//!
//! The platform expects an acknowledgement within a few seconds of every
//! delivery; handlers therefore answer inside the request cycle and push
//! all real work onto the runtime's background task pool.

pub mod commands;
pub mod events;
pub mod signature;

use axum::{Router, routing::post};
use tokio::net::TcpListener;
use tracing::info;

use crate::{base::types::Void, runtime::Runtime};

/// Build the webhook router.
pub fn build_router(runtime: Runtime) -> Router {
    Router::new()
        .route("/slack/events", post(events::handle_events))
        .route("/slack/commands", post(commands::handle_commands))
        .with_state(runtime)
}

/// Serve the webhook endpoints until ctrl-c, then drain background tasks.
pub async fn serve(runtime: Runtime) -> Void {
    let addr = format!("{}:{}", runtime.config.http_host, runtime.config.http_port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Webhook server listening on {}", addr);

    let tasks = runtime.tasks.clone();
    let app = build_router(runtime);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    // In-flight event handling finishes before the process exits.
    info!("Draining {} background task(s) ...", tasks.len());
    tasks.drain().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
