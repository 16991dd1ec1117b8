//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default Gemini model for text and multimodal generation.
fn default_gemini_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default Gemini model for image generation.
fn default_gemini_image_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

/// Default bind host for the webhook server.
fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

/// Default bind port for the webhook server.
fn default_http_port() -> u16 {
    3000
}

/// Default maximum characters per outbound message chunk.
fn default_message_chunk_limit() -> usize {
    3000
}

/// Default replay-attack window for signed requests, in seconds.
fn default_replay_window_secs() -> i64 {
    300
}

/// Configuration for the kobun-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    ///
    /// Empty disables request signature enforcement; the webhook handlers
    /// log the skip so the trust decision is visible.
    #[serde(default)]
    pub slack_signing_secret: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`). Empty fails at the first
    /// outbound chat call, not at startup.
    #[serde(default)]
    pub slack_bot_token: String,
    /// The bot's own platform-assigned user id (`SLACK_BOT_USER_ID`),
    /// used to strip mention markup from inbound text.
    #[serde(default)]
    pub slack_bot_user_id: String,
    /// Gemini API key (`GEMINI_API_KEY`). Empty fails at the first
    /// generative call.
    #[serde(default)]
    pub gemini_api_key: String,
    /// Gemini text/multimodal model (`GEMINI_TEXT_MODEL`).
    #[serde(default = "default_gemini_text_model")]
    pub gemini_text_model: String,
    /// Gemini image model (`GEMINI_IMAGE_MODEL`).
    #[serde(default = "default_gemini_image_model")]
    pub gemini_image_model: String,
    /// Webhook bind host (`HTTP_HOST`).
    #[serde(default = "default_http_host")]
    pub http_host: String,
    /// Webhook bind port (`HTTP_PORT`).
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Maximum characters per outbound message chunk
    /// (`MESSAGE_CHUNK_LIMIT`). Longer replies are split on line
    /// boundaries.
    #[serde(default = "default_message_chunk_limit")]
    pub message_chunk_limit: usize,
    /// Maximum age, in seconds, of a signed request before it is rejected
    /// as a replay (`REPLAY_WINDOW_SECS`).
    #[serde(default = "default_replay_window_secs")]
    pub replay_window_secs: i64,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("KOBUN_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.message_chunk_limit == 0 {
            return Err(anyhow::anyhow!("Message chunk limit must be at least 1."));
        }

        if result.replay_window_secs <= 0 {
            return Err(anyhow::anyhow!("Replay window must be a positive number of seconds."));
        }

        Ok(result)
    }
}
