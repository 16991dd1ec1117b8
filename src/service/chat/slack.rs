//! Slack implementation of the chat service.
//!
//! Message posting and reactions go through `slack-morphism`; raw file
//! transfer (authenticated downloads and the external upload flow) and
//! `response_url` callbacks use `reqwest` directly, since those endpoints
//! move opaque bytes rather than API envelopes.

use crate::base::{
    config::Config,
    types::{Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde::Deserialize;
use slack_morphism::prelude::*;
use tracing::{instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    bot_token: SlackApiToken,
    bot_token_value: String,
    client: Arc<FullClient>,
    http: reqwest::Client,
}

/// Response of `files.getUploadURLExternal`.
#[derive(Debug, Deserialize)]
struct SlackUploadUrlResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    upload_url: String,
    #[serde(default)]
    file_id: String,
}

/// Minimal `ok`/`error` acknowledgement shared by Slack Web API methods.
#[derive(Debug, Deserialize)]
struct SlackApiAck {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        if config.slack_bot_token.is_empty() {
            warn!("SLACK_BOT_TOKEN is not set; outbound chat calls will fail.");
        }

        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self {
            bot_token,
            bot_token_value: config.slack_bot_token.clone(),
            client,
            http: reqwest::Client::new(),
        })
    }

    /// Reserve an external upload slot for one file.
    async fn get_upload_url(&self, filename: &str, length: usize) -> Res<SlackUploadUrlResponse> {
        let response: SlackUploadUrlResponse = self
            .http
            .post("https://slack.com/api/files.getUploadURLExternal")
            .bearer_auth(&self.bot_token_value)
            .form(&[("filename", filename), ("length", &length.to_string())])
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(anyhow::anyhow!("Failed to reserve upload URL: {}", response.error.unwrap_or_default()));
        }

        Ok(response)
    }

    /// Finalize an external upload and share it into the channel.
    async fn complete_upload(&self, file_id: &str, title: &str, channel_id: &str, thread_ts: &str) -> Void {
        let mut payload = serde_json::json!({
            "files": [{"id": file_id, "title": title}],
            "channel_id": channel_id,
        });
        if !thread_ts.is_empty() {
            payload["thread_ts"] = serde_json::Value::String(thread_ts.to_string());
        }

        let response: SlackApiAck = self
            .http
            .post("https://slack.com/api/files.completeUploadExternal")
            .bearer_auth(&self.bot_token_value)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(anyhow::anyhow!("Failed to complete upload: {}", response.error.unwrap_or_default()));
        }

        Ok(())
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_link_names(true);

        if !thread_ts.is_empty() {
            request = request.with_thread_ts(SlackTs(thread_ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self, bytes))]
    async fn upload_file(&self, channel_id: &str, thread_ts: &str, bytes: &[u8], filename: &str, title: &str) -> Void {
        let slot = self.get_upload_url(filename, bytes.len()).await?;

        let response = self
            .http
            .post(&slot.upload_url)
            .bearer_auth(&self.bot_token_value)
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to upload file bytes: {}", response.status()));
        }

        self.complete_upload(&slot.file_id, title, channel_id, thread_ts).await
    }

    #[instrument(skip(self))]
    async fn download_file(&self, url: &str) -> Res<Vec<u8>> {
        let response = self.http.get(url).bearer_auth(&self.bot_token_value).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to download file: {}", response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    #[instrument(skip(self))]
    async fn add_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(emoji.to_string()),
            timestamp: SlackTs(ts.to_string()),
        };

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to add reaction: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsRemoveRequest::new(SlackReactionName(emoji.to_string()))
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_timestamp(SlackTs(ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_remove(&request).await.map_err(|e| anyhow::anyhow!("Failed to remove reaction: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn send_delayed_response(&self, response_url: &str, payload: &serde_json::Value) -> Void {
        let response = self.http.post(response_url).json(payload).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to post delayed response: {}", response.status()));
        }

        Ok(())
    }
}

// Tests.
