//! Bot initialization and message routing utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Message addressing logic (private chats, mentions, replies)

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatKind, Message, MessageEntityKind, UserId};
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start Filipino verification")]
    Start,
    #[command(description = "check your verification status")]
    Status,
    #[command(description = "show help")]
    Help,
    #[command(description = "ban a user (admins only)")]
    Ban(String),
    #[command(description = "lift a ban (admins only)")]
    Unban(String),
    #[command(description = "verification statistics (admins only)")]
    Stats,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(AppError)` - Missing token, invalid BOT_API_URL, or HTTP client setup failure
pub fn create_bot() -> AppResult<Bot> {
    if config::BOT_TOKEN.is_empty() {
        return Err(AppError::Config(
            "BOT_TOKEN (or TELOXIDE_TOKEN) environment variable is not set".to_string(),
        ));
    }

    let client = ClientBuilder::new()
        .timeout(config::network::timeout())
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    // Check if local Bot API server is configured
    match config::bot_api::get_url() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(&bot_api_url)?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Commands shown in the Telegram UI. Admin commands are left out.
pub fn public_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "start Filipino verification"),
        BotCommand::new("status", "check your verification status"),
        BotCommand::new("help", "show help"),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(public_commands()).await?;
    Ok(())
}

/// Checks if a message is addressed to the bot
///
/// # Returns
/// * `true` if message is addressed to bot (private chat, bot mention, reply to bot message)
/// * `false` if message is not addressed to bot
pub fn is_message_addressed_to_bot(msg: &Message, bot_username: Option<&str>, bot_id: UserId) -> bool {
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    if let Some(from) = msg.reply_to_message().and_then(|reply| reply.from.as_ref()) {
        if from.id == bot_id {
            return true;
        }
    }

    let (Some(text), Some(username)) = (msg.text(), bot_username) else {
        return false;
    };

    let mentioned = msg.entities().unwrap_or_default().iter().any(|entity| {
        matches!(entity.kind, MessageEntityKind::Mention)
            && text
                .get(entity.offset..entity.offset + entity.length)
                .map(|mention| mention.trim_start_matches('@').eq_ignore_ascii_case(username))
                .unwrap_or(false)
    });

    mentioned || text.contains(&format!("@{}", username))
}

/// Parses the `<user_id>` argument of admin commands.
pub fn parse_user_id_arg(arg: &str) -> Option<i64> {
    arg.split_whitespace().next()?.parse::<i64>().ok().filter(|id| *id > 0)
}
