//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Handlers only unpack updates; the decisions live in `telegram::flow`.

mod commands;
mod schema;
mod types;

pub use schema::schema;
pub use types::{requester_from_user, HandlerDeps, HandlerError};
