//! Bot API calls the verification flow depends on.
//!
//! The `MembershipGateway` trait keeps the flow free of teloxide request
//! builders, so it can run against a recording gateway in tests.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode, ReplyMarkup};

use crate::core::error::{AppError, AppResult};

/// Reply keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKeyboard {
    /// Leave whatever keyboard the user currently has
    Keep,
    /// One-time keyboard with a single "share my contact" button
    RequestContact(String),
    /// Remove the reply keyboard
    Remove,
}

/// Join-request moderation and direct messages, as used by the flow.
#[async_trait]
pub trait MembershipGateway: Send + Sync {
    async fn approve(&self, chat_id: i64, user_id: i64) -> AppResult<()>;

    async fn decline(&self, chat_id: i64, user_id: i64) -> AppResult<()>;

    /// Sends an HTML message.
    async fn send(&self, chat_id: i64, text: &str, keyboard: ReplyKeyboard) -> AppResult<()>;
}

/// Gateway backed by the real Bot API.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn user_id(raw: i64) -> AppResult<UserId> {
    u64::try_from(raw)
        .map(UserId)
        .map_err(|_| AppError::Config(format!("invalid Telegram user id: {}", raw)))
}

fn reply_markup(keyboard: ReplyKeyboard) -> Option<ReplyMarkup> {
    match keyboard {
        ReplyKeyboard::Keep => None,
        ReplyKeyboard::RequestContact(label) => {
            let button = KeyboardButton::new(label).request(ButtonRequest::Contact);
            let mut markup = KeyboardMarkup::new(vec![vec![button]]);
            markup.resize_keyboard = true;
            markup.one_time_keyboard = true;
            Some(markup.into())
        }
        ReplyKeyboard::Remove => Some(KeyboardRemove::new().into()),
    }
}

#[async_trait]
impl MembershipGateway for TelegramGateway {
    async fn approve(&self, chat_id: i64, user_id_raw: i64) -> AppResult<()> {
        self.bot
            .approve_chat_join_request(ChatId(chat_id), user_id(user_id_raw)?)
            .await?;
        Ok(())
    }

    async fn decline(&self, chat_id: i64, user_id_raw: i64) -> AppResult<()> {
        self.bot
            .decline_chat_join_request(ChatId(chat_id), user_id(user_id_raw)?)
            .await?;
        Ok(())
    }

    async fn send(&self, chat_id: i64, text: &str, keyboard: ReplyKeyboard) -> AppResult<()> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(markup) = reply_markup(keyboard) {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}
