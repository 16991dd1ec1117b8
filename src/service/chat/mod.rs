pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the outbound half of a chat platform: posting
/// messages and media, fetching user-uploaded files, and best-effort
/// reaction markers. Implementing it allows different chat services to be
/// used with the kobun-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Send a text message to a channel.
    ///
    /// An empty `thread_ts` posts top-level; anything else anchors the
    /// reply to that thread.
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;

    /// Upload a binary file to a channel, with the same thread anchoring
    /// as [`GenericChatClient::send_message`].
    async fn upload_file(&self, channel_id: &str, thread_ts: &str, bytes: &[u8], filename: &str, title: &str) -> Void;

    /// Download a user-uploaded file via its temporary, authenticated URL.
    async fn download_file(&self, url: &str) -> Res<Vec<u8>>;

    /// Add a transient reaction marker to a message.
    ///
    /// Callers treat failures as non-fatal.
    async fn add_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;

    /// Remove a reaction marker previously added to a message.
    async fn remove_reaction(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;

    /// Deliver a delayed slash-command result to its `response_url`.
    async fn send_delayed_response(&self, response_url: &str, payload: &serde_json::Value) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
