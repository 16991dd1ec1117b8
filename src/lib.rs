//! Library root for `kobun-bot`.
//!
//! Kobun-bot is a Gemini-powered assistant for Slack workspaces designed to:
//! - Answer mentions and direct messages with generated text
//! - Generate images from prompts, and transform attached reference images
//! - Describe uploaded images on request
//! - Degrade gracefully to a textual description when image generation is unavailable
//!
//! The bot receives Slack events over a signed HTTP webhook and forwards
//! user requests to the Gemini API. The architecture is built around
//! extensible traits that allow for different implementations of each
//! service.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the kobun-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat and generative clients
/// - Starts the webhook server
pub async fn start(config: Config) -> Void {
    info!("Starting kobun-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
