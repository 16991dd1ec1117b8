//! Response orchestration for dispatched mentions and direct messages.
//!
//! One dispatched event becomes one background task. The task adds a
//! thinking reaction, acknowledges before any generative call, handles the
//! classified intent, and converts any failure into an apology reply: an
//! accepted event is never left unanswered.

use futures::future::try_join_all;
use tracing::Instrument;

use crate::{
    base::{
        prompts,
        types::{FileRef, InboundEvent, Intent},
    },
    interaction::intent,
    prelude::*,
    runtime::TaskPool,
    service::{
        chat::ChatClient,
        genai::{GenAiClient, ReferenceImage},
    },
};

/// Handle one dispatched mention or direct-message event.
///
/// Submits the work to the background pool and returns immediately so the
/// webhook response is never held up.
#[instrument(skip_all)]
pub fn handle_mention(event: InboundEvent, config: Config, chat: ChatClient, genai: GenAiClient, tasks: &TaskPool) {
    tasks.submit(async move {
        // Process the event.
        let result = handle_mention_internal(event, &config, &chat, &genai).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_mention_internal(event: InboundEvent, config: &Config, chat: &ChatClient, genai: &GenAiClient) -> Void {
    let channel_id = event.channel.clone().ok_or(anyhow!("Failed to get channel ID"))?;
    let ts = event.ts.clone().ok_or(anyhow!("Failed to get message timestamp"))?;

    // Replies thread under the triggering message.
    let reply_ts = event.thread_ts.clone().unwrap_or_else(|| ts.clone());

    // Best effort; a missing reaction never blocks the reply.
    let _ = chat.add_reaction(&channel_id, &ts, prompts::THINKING_REACTION).await;

    let text = event.text.clone().unwrap_or_default();
    let prompt = intent::normalize(&text, &config.slack_bot_user_id);
    let selected = intent::classify(&prompt, !event.files.is_empty());

    info!("Classified event as {:?}", selected);

    let outcome = match selected {
        Intent::TextReply => handle_text_reply(&channel_id, &reply_ts, &prompt, config, chat, genai).await,
        Intent::ImageGeneration => handle_image_generation(&channel_id, &reply_ts, &prompt, chat, genai).await,
        Intent::ImageAnalysis => handle_image_analysis(&channel_id, &reply_ts, &prompt, &event.files, chat, genai).await,
        Intent::ImageToImage => handle_image_to_image(&channel_id, &reply_ts, &prompt, &event.files, chat, genai).await,
    };

    if let Err(err) = outcome {
        error!("Error while generating reply: {}", err);
        chat.send_message(&channel_id, &reply_ts, prompts::GENERIC_FAILURE_REPLY).await?;
    }

    let _ = chat.remove_reaction(&channel_id, &ts, prompts::THINKING_REACTION).await;

    Ok(())
}

/// Plain conversational reply.
async fn handle_text_reply(channel_id: &str, reply_ts: &str, prompt: &str, config: &Config, chat: &ChatClient, genai: &GenAiClient) -> Void {
    if prompt.is_empty() {
        return chat.send_message(channel_id, reply_ts, prompts::EMPTY_PROMPT_REPLY).await;
    }

    chat.send_message(channel_id, reply_ts, prompts::THINKING_ACK).await?;

    let response = genai.generate_text(prompt).await?;

    // Long replies are split on line boundaries and sent in order.
    if response.chars().count() > config.message_chunk_limit {
        for chunk in split_message(&response, config.message_chunk_limit) {
            chat.send_message(channel_id, reply_ts, &chunk).await?;
        }
    } else {
        chat.send_message(channel_id, reply_ts, &response).await?;
    }

    Ok(())
}

/// Text-to-image generation, degrading to a description when no image
/// comes back.
async fn handle_image_generation(channel_id: &str, reply_ts: &str, prompt: &str, chat: &ChatClient, genai: &GenAiClient) -> Void {
    let image_prompt = intent::creative_prompt(prompt);

    chat.send_message(channel_id, reply_ts, &prompts::image_ack(&image_prompt)).await?;

    match genai.generate_image(&image_prompt).await? {
        Some(bytes) => {
            chat.upload_file(channel_id, reply_ts, &bytes, prompts::GENERATED_IMAGE_FILENAME, &prompts::image_caption(&image_prompt))
                .await
        }
        None => {
            let description = genai.generate_text(&format!("{}{image_prompt}", prompts::IMAGE_DESCRIPTION_DIRECTIVE)).await?;
            chat.send_message(channel_id, reply_ts, &format!("{}{description}", prompts::IMAGE_FALLBACK_PREFIX)).await
        }
    }
}

/// Describe the first attached image.
async fn handle_image_analysis(channel_id: &str, reply_ts: &str, prompt: &str, files: &[FileRef], chat: &ChatClient, genai: &GenAiClient) -> Void {
    let Some(image) = files.iter().find(|f| f.is_image()) else {
        return chat.send_message(channel_id, reply_ts, prompts::ATTACH_IMAGE_REPLY).await;
    };

    chat.send_message(channel_id, reply_ts, prompts::THINKING_ACK).await?;

    let bytes = chat.download_file(&image.url_private).await?;

    let analysis_prompt = if prompt.is_empty() { prompts::DEFAULT_ANALYSIS_PROMPT } else { prompt };
    let response = genai.generate_with_image(analysis_prompt, &bytes, &image.mimetype).await?;

    chat.send_message(channel_id, reply_ts, &response).await
}

/// Generate a new image conditioned on every attached reference image.
async fn handle_image_to_image(channel_id: &str, reply_ts: &str, prompt: &str, files: &[FileRef], chat: &ChatClient, genai: &GenAiClient) -> Void {
    let images: Vec<&FileRef> = files.iter().filter(|f| f.is_image()).collect();

    if images.is_empty() {
        return chat.send_message(channel_id, reply_ts, prompts::ATTACH_IMAGE_REPLY).await;
    }

    let image_prompt = intent::transformation_prompt(prompt);

    chat.send_message(channel_id, reply_ts, &prompts::image_ack(&image_prompt)).await?;

    let references = try_join_all(images.iter().map(|file| async move {
        let bytes = chat.download_file(&file.url_private).await?;

        Ok::<_, Err>(ReferenceImage {
            bytes,
            mime_type: file.mimetype.clone(),
        })
    }))
    .await?;

    match genai.generate_image_from_reference(&image_prompt, &references).await? {
        Some(bytes) => {
            chat.upload_file(channel_id, reply_ts, &bytes, prompts::GENERATED_IMAGE_FILENAME, &prompts::image_caption(&image_prompt))
                .await
        }
        None => {
            // Describe the intended transformation off the first reference.
            let first = &references[0];
            let description = genai
                .generate_with_image(&format!("{}{image_prompt}", prompts::TRANSFORM_DESCRIPTION_DIRECTIVE), &first.bytes, &first.mime_type)
                .await?;

            chat.send_message(channel_id, reply_ts, &format!("{}{description}", prompts::IMAGE_FALLBACK_PREFIX)).await
        }
    }
}

/// Split text into chunks of at most `limit` characters, breaking only on
/// line boundaries.
///
/// Joining the chunks back with newlines reproduces the input exactly. A
/// single line longer than the limit becomes its own oversized chunk rather
/// than being cut mid-line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.split('\n') {
        current = Some(match current.take() {
            None => line.to_string(),
            Some(mut chunk) => {
                if chunk.chars().count() + 1 + line.chars().count() > limit {
                    chunks.push(chunk);
                    line.to_string()
                } else {
                    chunk.push('\n');
                    chunk.push_str(line);
                    chunk
                }
            }
        });
    }

    if let Some(chunk) = current {
        chunks.push(chunk);
    }

    chunks
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_message_respects_limit_and_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\ndddd";

        let chunks = split_message(text, 9);

        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc\ndddd"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn split_message_reconstructs_input_exactly() {
        let text = "短い行\n\nこれは少し長めの行です\n末尾";

        let chunks = split_message(text, 10);

        assert_eq!(chunks.join("\n"), text);
        for chunk in &chunks {
            for line in chunk.split('\n') {
                assert!(text.split('\n').any(|original| original == line));
            }
        }
    }

    #[test]
    fn split_message_keeps_short_text_whole() {
        assert_eq!(split_message("hello\nworld", 100), vec!["hello\nworld"]);
    }

    #[test]
    fn split_message_emits_oversized_line_as_single_chunk() {
        let long_line = "x".repeat(25);
        let text = format!("short\n{long_line}\ntail");

        let chunks = split_message(&text, 10);

        assert_eq!(chunks, vec!["short".to_string(), long_line, "tail".to_string()]);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn split_message_counts_characters_not_bytes() {
        // Ten three-byte characters per line; a byte count would split these.
        let text = "あいうえおかきくけこ\nさしすせそたちつてと";

        let chunks = split_message(text, 21);

        assert_eq!(chunks.len(), 1);
    }
}
