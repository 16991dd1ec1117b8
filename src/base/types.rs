use serde::Deserialize;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The outer webhook payload posted by the chat platform.
///
/// Unknown payload types collapse into [`EventEnvelope::Other`] so that new
/// platform event families never break parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// One-time endpoint handshake; the token must be echoed back.
    UrlVerification { challenge: String },
    /// A real event wrapped in the platform's callback envelope.
    EventCallback { event: InboundEvent },
    #[serde(other)]
    Other,
}

/// The event type carried inside an `event_callback` envelope.
///
/// The platform's event-type set is open-ended; anything we do not handle
/// maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum EventKind {
    AppMention,
    Message,
    Other,
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "app_mention" => Self::AppMention,
            "message" => Self::Message,
            _ => Self::Other,
        }
    }
}

/// One file reference attached to an inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileRef {
    /// Temporary fetch URL; downloads require the bot token.
    #[serde(default)]
    pub url_private: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub name: String,
}

impl FileRef {
    pub fn is_image(&self) -> bool {
        self.mimetype.starts_with("image/")
    }
}

/// A single chat-platform notification, parsed once per inbound request.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Platform-assigned timestamp; doubles as the reply-threading anchor.
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    /// Present when the message was produced by a bot, including us.
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl InboundEvent {
    /// Bot-originated events must never reach the classifier.
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some()
    }
}

/// The routing decision for one webhook payload.
#[derive(Debug, Clone)]
pub enum RouteAction {
    /// Echo the handshake token within the request cycle.
    RespondChallenge(String),
    /// Acknowledge and drop.
    Ignore,
    /// Acknowledge, then process the event in the background.
    Dispatch(InboundEvent),
}

/// The handling strategy selected for one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Attachments plus transformation language.
    ImageToImage,
    /// Generation command or phrasing, no reference images needed.
    ImageGeneration,
    /// Attachments without generation language.
    ImageAnalysis,
    /// Plain text conversation; the fallback.
    TextReply,
}
