//! Gateway that records Bot API calls instead of sending them

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use pinoy_gate::core::AppError;
use pinoy_gate::telegram::{MembershipGateway, ReplyKeyboard};
use pinoy_gate::AppResult;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Approve { chat_id: i64, user_id: i64 },
    Decline { chat_id: i64, user_id: i64 },
    Send { chat_id: i64, text: String, keyboard: ReplyKeyboard },
}

/// `MembershipGateway` that stores every call and can be told to fail
/// for specific chats.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    unreachable_chats: Mutex<HashSet<i64>>,
    failing_approvals: Mutex<HashSet<i64>>,
    failing_declines: Mutex<HashSet<i64>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages to this chat fail, like a user who never started the bot.
    pub fn make_unreachable(&self, chat_id: i64) {
        self.unreachable_chats.lock().unwrap().insert(chat_id);
    }

    /// Approvals in this chat fail, like a request that already expired.
    pub fn fail_approvals_in(&self, chat_id: i64) {
        self.failing_approvals.lock().unwrap().insert(chat_id);
    }

    /// Declines in this chat fail.
    pub fn fail_declines_in(&self, chat_id: i64) {
        self.failing_declines.lock().unwrap().insert(chat_id);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn approvals(&self) -> Vec<(i64, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Approve { chat_id, user_id } => Some((chat_id, user_id)),
                _ => None,
            })
            .collect()
    }

    pub fn declines(&self) -> Vec<(i64, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Decline { chat_id, user_id } => Some((chat_id, user_id)),
                _ => None,
            })
            .collect()
    }

    /// Messages sent to one chat, in order.
    pub fn messages_to(&self, chat: i64) -> Vec<(String, ReplyKeyboard)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Send {
                    chat_id,
                    text,
                    keyboard,
                } if chat_id == chat => Some((text, keyboard)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MembershipGateway for RecordingGateway {
    async fn approve(&self, chat_id: i64, user_id: i64) -> AppResult<()> {
        if self.failing_approvals.lock().unwrap().contains(&chat_id) {
            return Err(AppError::Config(format!("approve failed in {}", chat_id)));
        }
        self.record(GatewayCall::Approve { chat_id, user_id });
        Ok(())
    }

    async fn decline(&self, chat_id: i64, user_id: i64) -> AppResult<()> {
        if self.failing_declines.lock().unwrap().contains(&chat_id) {
            return Err(AppError::Config(format!("decline failed in {}", chat_id)));
        }
        self.record(GatewayCall::Decline { chat_id, user_id });
        Ok(())
    }

    async fn send(&self, chat_id: i64, text: &str, keyboard: ReplyKeyboard) -> AppResult<()> {
        if self.unreachable_chats.lock().unwrap().contains(&chat_id) {
            return Err(AppError::Config(format!("bot can't initiate conversation with {}", chat_id)));
        }
        self.record(GatewayCall::Send {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }
}
