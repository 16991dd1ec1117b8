//! Inbound event webhook: verification, routing, and background dispatch.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{EventEnvelope, EventKind, InboundEvent, RouteAction},
    interaction,
    runtime::Runtime,
};

use super::signature;

/// Prefix of direct-message channel identifiers.
const DM_CHANNEL_PREFIX: char = 'D';

/// Decide what to do with one webhook payload.
///
/// Pure function of the payload; the HTTP handler performs the side
/// effects for the chosen action.
pub fn route(envelope: EventEnvelope) -> RouteAction {
    match envelope {
        EventEnvelope::UrlVerification { challenge } => RouteAction::RespondChallenge(challenge),
        EventEnvelope::EventCallback { event } => route_event(event),
        EventEnvelope::Other => RouteAction::Ignore,
    }
}

fn route_event(event: InboundEvent) -> RouteAction {
    // Bot-originated traffic is dropped before anything else; replying to
    // our own messages would loop forever.
    if event.is_from_bot() {
        return RouteAction::Ignore;
    }

    let has_origin = event.channel.is_some() && event.ts.is_some();

    match event.kind {
        EventKind::AppMention if has_origin => RouteAction::Dispatch(event),
        EventKind::Message if has_origin && event.channel.as_deref().is_some_and(|c| c.starts_with(DM_CHANNEL_PREFIX)) => {
            RouteAction::Dispatch(event)
        }
        _ => RouteAction::Ignore,
    }
}

/// `POST /slack/events`.
///
/// Always answers within the request cycle: dispatched events are handed
/// to the background pool before the acknowledgement goes out.
#[instrument(skip_all)]
pub async fn handle_events(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    let raw = String::from_utf8_lossy(&body);

    // Signature first; a mis-signed handshake is rejected too.
    if !signature::verify_request(&runtime.config, &headers, &raw) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid signature"}))).into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("Failed to parse event payload: {}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "Internal server error"}))).into_response();
        }
    };

    match route(envelope) {
        RouteAction::RespondChallenge(challenge) => Json(json!({"challenge": challenge})).into_response(),
        RouteAction::Ignore => Json(json!({"ok": true})).into_response(),
        RouteAction::Dispatch(event) => {
            info!("Dispatching event for background handling ...");

            interaction::mention::handle_mention(event, runtime.config.clone(), runtime.chat.clone(), runtime.genai.clone(), &runtime.tasks);

            Json(json!({"ok": true})).into_response()
        }
    }
}

// Tests.
