//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use pinoy_gate::core::{BotSettings, JoinRequestInfo, Verifier};
use pinoy_gate::storage::db::create_memory_pool;
use pinoy_gate::storage::{MemoryStore, SqliteStore};
use pinoy_gate::telegram::Requester;

use super::recorder::RecordingGateway;

pub const ADMIN_ID: i64 = 1000;
pub const GROUP_CHAT: i64 = -1001111111111;
pub const OTHER_GROUP_CHAT: i64 = -1002222222222;

/// Everything a flow test needs: verifier, gateway and settings.
pub struct TestEnvironment {
    pub verifier: Verifier,
    pub gateway: RecordingGateway,
    pub settings: BotSettings,
}

impl TestEnvironment {
    /// In-memory store, one admin, no invite link.
    pub fn new() -> Self {
        Self::with_verifier(Verifier::new(Arc::new(MemoryStore::new())))
    }

    /// Same as `new` but backed by SQLite (in-memory database with migrations).
    pub fn with_sqlite() -> Self {
        let pool = create_memory_pool().expect("memory pool");
        Self::with_verifier(Verifier::new(Arc::new(SqliteStore::new(Arc::new(pool)))))
    }

    fn with_verifier(verifier: Verifier) -> Self {
        Self {
            verifier,
            gateway: RecordingGateway::new(),
            settings: BotSettings {
                admin_ids: vec![ADMIN_ID],
                admin_chat_id: ADMIN_ID,
                invite_link: None,
            },
        }
    }

    pub fn with_invite_link(mut self, link: &str) -> Self {
        self.settings.invite_link = Some(link.to_string());
        self
    }
}

/// A regular user; the private chat id equals the user id, as on Telegram.
pub fn user(user_id: i64, first_name: &str) -> Requester {
    Requester {
        user_id,
        first_name: first_name.to_string(),
        username: Some(first_name.to_lowercase()),
        is_bot: false,
        dm_chat_id: user_id,
    }
}

pub fn admin() -> Requester {
    user(ADMIN_ID, "Admin")
}

pub fn join_request(user_id: i64, chat_id: i64) -> JoinRequestInfo {
    JoinRequestInfo {
        user_id,
        chat_id,
        chat_title: Some("Pinoy Devs".to_string()),
    }
}
