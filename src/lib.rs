//! Pinoy Gate - Telegram join-request gate for Filipino communities
//!
//! Join requests are approved only for users who share a Philippine (+63)
//! phone number. Verified numbers are remembered, so later requests are
//! approved without asking again.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, and the verification decision logic
//! - `storage`: SQLite pool, migrations, and the verification store
//! - `telegram`: Bot API integration, handlers, and the verification flow
//! - `cli`: command-line interface

#![allow(clippy::too_many_arguments)]

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{classify, config, normalize_phone, AppError, AppResult, Decision, JoinEvent, Verifier};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, MemoryStore, SqliteStore, VerificationStore};
pub use telegram::{schema, HandlerDeps, MembershipGateway, TelegramGateway};
