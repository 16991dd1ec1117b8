//! Slash-command webhook: acknowledgement and background dispatch.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{base::prompts, interaction, runtime::Runtime};

use super::signature;

/// `POST /slack/commands`.
///
/// Form-encoded body. The synchronous response carries only the
/// acknowledgement; generative results are delivered later through the
/// platform-supplied `response_url`.
#[instrument(skip_all)]
pub async fn handle_commands(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    let raw = String::from_utf8_lossy(&body);

    if !signature::verify_request(&runtime.config, &headers, &raw) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid signature"}))).into_response();
    }

    let params: HashMap<String, String> = form_urlencoded::parse(raw.as_bytes()).into_owned().collect();

    let command = params.get("command").map(String::as_str).unwrap_or_default();
    let text = params.get("text").cloned().unwrap_or_default();
    let channel_id = params.get("channel_id").cloned().unwrap_or_default();
    let response_url = params.get("response_url").cloned().unwrap_or_default();

    match command {
        "/gemini" | "/ai" | "/kobun" => {
            info!("Dispatching text command ...");

            interaction::command::handle_text_command(text, response_url, runtime.chat.clone(), runtime.genai.clone(), &runtime.tasks);

            Json(json!({"response_type": "in_channel", "text": prompts::THINKING_ACK})).into_response()
        }
        "/image" | "/画像" => {
            info!("Dispatching image command ...");

            let ack = prompts::image_ack(&text);
            interaction::command::handle_image_command(text, channel_id, response_url, runtime.chat.clone(), runtime.genai.clone(), &runtime.tasks);

            Json(json!({"response_type": "in_channel", "text": ack})).into_response()
        }
        other => {
            warn!("Unknown command: {}", other);

            Json(json!({"response_type": "ephemeral", "text": prompts::UNKNOWN_COMMAND_REPLY})).into_response()
        }
    }
}
