//! Core components, types, and utilities for the kobun-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - User-visible reply templates and generative directives.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
