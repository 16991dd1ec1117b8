//! Slash-command orchestration.
//!
//! Slash commands answer synchronously with a short acknowledgement; the
//! generative result is delivered later by POSTing to the platform-supplied
//! `response_url`. Failures are reported through the same callback so the
//! user is never left waiting.

use serde_json::json;
use tracing::Instrument;

use crate::{
    base::prompts,
    prelude::*,
    runtime::TaskPool,
    service::{chat::ChatClient, genai::GenAiClient},
};

/// Handle a text-generation slash command in the background.
#[instrument(skip_all)]
pub fn handle_text_command(text: String, response_url: String, chat: ChatClient, genai: GenAiClient, tasks: &TaskPool) {
    tasks.submit(async move {
        let result = handle_text_command_internal(&text, &response_url, &chat, &genai).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling text command: {}", err);

            let payload = json!({"response_type": "ephemeral", "text": prompts::GENERIC_FAILURE_REPLY});
            if let Err(err) = chat.send_delayed_response(&response_url, &payload).await {
                error!("Error while delivering failure response: {}", err);
            }
        }
    });
}

#[instrument(skip_all)]
async fn handle_text_command_internal(text: &str, response_url: &str, chat: &ChatClient, genai: &GenAiClient) -> Void {
    if text.trim().is_empty() {
        let payload = json!({"response_type": "ephemeral", "text": prompts::EMPTY_COMMAND_PROMPT_REPLY});
        return chat.send_delayed_response(response_url, &payload).await;
    }

    let response = genai.generate_text(text).await?;

    let payload = json!({"response_type": "in_channel", "text": response});
    chat.send_delayed_response(response_url, &payload).await
}

/// Handle an image-generation slash command in the background.
#[instrument(skip_all)]
pub fn handle_image_command(text: String, channel_id: String, response_url: String, chat: ChatClient, genai: GenAiClient, tasks: &TaskPool) {
    tasks.submit(async move {
        let result = handle_image_command_internal(&text, &channel_id, &response_url, &chat, &genai).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling image command: {}", err);

            let payload = json!({"response_type": "ephemeral", "text": prompts::IMAGE_COMMAND_FAILURE_REPLY, "replace_original": true});
            if let Err(err) = chat.send_delayed_response(&response_url, &payload).await {
                error!("Error while delivering failure response: {}", err);
            }
        }
    });
}

#[instrument(skip_all)]
async fn handle_image_command_internal(text: &str, channel_id: &str, response_url: &str, chat: &ChatClient, genai: &GenAiClient) -> Void {
    if text.trim().is_empty() {
        let payload = json!({"response_type": "ephemeral", "text": prompts::EMPTY_IMAGE_PROMPT_REPLY});
        return chat.send_delayed_response(response_url, &payload).await;
    }

    match genai.generate_image(text).await? {
        Some(bytes) => {
            chat.upload_file(channel_id, "", &bytes, prompts::GENERATED_IMAGE_FILENAME, &prompts::image_caption(text)).await?;

            let payload = json!({"response_type": "in_channel", "text": prompts::image_uploaded(text), "replace_original": true});
            chat.send_delayed_response(response_url, &payload).await
        }
        None => {
            let description = genai.generate_text(&format!("{}{text}", prompts::IMAGE_DESCRIPTION_DIRECTIVE)).await?;

            let payload = json!({
                "response_type": "in_channel",
                "text": format!("{}{description}", prompts::IMAGE_FALLBACK_PREFIX),
                "replace_original": true,
            });
            chat.send_delayed_response(response_url, &payload).await
        }
    }
}
