//! Inbound request signature verification.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::base::config::Config;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the request timestamp.
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Verify an inbound request signature.
///
/// Recomputes `v0=hex(hmac_sha256(secret, "v0:{timestamp}:{body}"))` and
/// compares against the presented signature in constant time. Requests
/// whose timestamp lies further than `window_secs` from the current time
/// are rejected outright, bounding the replay window regardless of
/// signature validity.
pub fn verify(secret: &str, signature: &str, timestamp: &str, body: &str, window_secs: i64) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };

    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > window_secs {
        return false;
    }

    let base = format!("v0:{timestamp}:{body}");
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(base.as_bytes());
    let expected = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

/// Verify the signature headers of one inbound request.
///
/// An unset signing secret skips verification entirely; the skip is logged
/// so the trust decision is visible rather than silent.
pub fn verify_request(config: &Config, headers: &HeaderMap, body: &str) -> bool {
    if config.slack_signing_secret.is_empty() {
        warn!("Signing secret not configured; accepting request without verification.");
        return true;
    }

    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");

    verify(&config.slack_signing_secret, signature, timestamp, body, config.replay_window_secs)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    /// Compute a valid signature the way the platform does.
    fn sign(secret: &str, timestamp: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("v0:{timestamp}:{body}").as_bytes());
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn accepts_a_valid_signature() {
        let timestamp = now().to_string();
        let body = r#"{"type":"event_callback"}"#;
        let signature = sign(SECRET, &timestamp, body);

        assert!(verify(SECRET, &signature, &timestamp, body, 300));
    }

    #[test]
    fn verification_is_deterministic() {
        let timestamp = now().to_string();
        let body = "payload";
        let signature = sign(SECRET, &timestamp, body);

        let first = verify(SECRET, &signature, &timestamp, body, 300);
        let second = verify(SECRET, &signature, &timestamp, body, 300);

        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn rejects_a_stale_timestamp() {
        let timestamp = (now() - 400).to_string();
        let body = "payload";
        let signature = sign(SECRET, &timestamp, body);

        assert!(!verify(SECRET, &signature, &timestamp, body, 300));
    }

    #[test]
    fn rejects_a_future_timestamp() {
        let timestamp = (now() + 400).to_string();
        let body = "payload";
        let signature = sign(SECRET, &timestamp, body);

        assert!(!verify(SECRET, &signature, &timestamp, body, 300));
    }

    #[test]
    fn stale_rejection_honors_the_configured_window() {
        let timestamp = (now() - 400).to_string();
        let body = "payload";
        let signature = sign(SECRET, &timestamp, body);

        assert!(verify(SECRET, &signature, &timestamp, body, 600));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let timestamp = now().to_string();
        let signature = sign(SECRET, &timestamp, "original");

        assert!(!verify(SECRET, &signature, &timestamp, "tampered", 300));
    }

    #[test]
    fn rejects_a_forged_signature() {
        let timestamp = now().to_string();

        assert!(!verify(SECRET, "v0=deadbeef", &timestamp, "payload", 300));
    }

    #[test]
    fn rejects_a_non_numeric_timestamp() {
        assert!(!verify(SECRET, "v0=deadbeef", "yesterday", "payload", 300));
    }
}
