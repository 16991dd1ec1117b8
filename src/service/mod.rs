//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the kobun-bot:
//! - Chat services (e.g., Slack)
//! - Generative AI services (e.g., Gemini)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod genai;
