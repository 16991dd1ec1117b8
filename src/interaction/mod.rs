//! Event handling and user interactions for kobun-bot.
//!
//! This module provides functionality for handling dispatched chat events:
//! - Classifying user intent from message text and attachments
//! - Orchestrating generative calls and replies for mentions and DMs
//! - Handling slash commands with delayed responses

pub mod command;
pub mod intent;
pub mod mention;
