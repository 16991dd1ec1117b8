pub mod gemini;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Structs.

/// One reference image handed to image-to-image generation.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

// Traits.

/// Generic generative-AI client trait that clients must implement.
///
/// This trait defines the four generative operations the bot relies on.
/// Implementing it allows different hosted model providers to be used with
/// the kobun-bot.
#[async_trait]
pub trait GenericGenAiClient: Send + Sync + 'static {
    /// Generate a plain text response for a prompt.
    async fn generate_text(&self, prompt: &str) -> Res<String>;

    /// Generate an image for a prompt.
    ///
    /// Returns `None` when the service produced no image data, which callers
    /// treat as "degrade gracefully" rather than an error.
    async fn generate_image(&self, prompt: &str) -> Res<Option<Vec<u8>>>;

    /// Generate a text response for a prompt plus one inline image.
    async fn generate_with_image(&self, prompt: &str, image: &[u8], mime_type: &str) -> Res<String>;

    /// Generate an image conditioned on one or more reference images.
    async fn generate_image_from_reference(&self, prompt: &str, references: &[ReferenceImage]) -> Res<Option<Vec<u8>>>;
}

/// Generative-AI client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct GenAiClient {
    inner: Arc<dyn GenericGenAiClient>,
}

impl Deref for GenAiClient {
    type Target = dyn GenericGenAiClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl GenAiClient {
    pub fn new(inner: Arc<dyn GenericGenAiClient>) -> Self {
        Self { inner }
    }
}
