//! Telegram bot integration and handlers

pub mod bot;
pub mod flow;
pub mod gateway;
pub mod handlers;
pub mod messages;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use flow::{ContactOutcome, Requester, SharedContact};
pub use gateway::{MembershipGateway, ReplyKeyboard, TelegramGateway};
pub use handlers::{schema, HandlerDeps, HandlerError};
