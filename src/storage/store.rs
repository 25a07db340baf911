//! Verification store abstraction
//!
//! The verifier never touches global state: everything it knows about a user
//! (verified phone, ban, pending join requests) comes through the
//! `VerificationStore` trait, injected at construction time.
//!
//! Two implementations:
//! - `SqliteStore`: production store on top of the r2d2 pool
//! - `MemoryStore`: process-local store for `run --ephemeral` and tests

use dashmap::{DashMap, DashSet};
use std::sync::Arc;

use super::db::{get_connection, DbPool};
use super::join_requests::{self, JoinRequestRecord, JoinRequestStatus};
use super::verified::{self, UserProfile, VerifiedUser};
use crate::core::error::AppResult;

/// Aggregate counters shown by the admin `/stats` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub verified: i64,
    pub banned: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Key-value store of verification state, keyed by Telegram user id.
pub trait VerificationStore: Send + Sync {
    /// Verified user row, including banned users.
    fn verified_user(&self, user_id: i64) -> AppResult<Option<VerifiedUser>>;

    fn is_banned(&self, user_id: i64) -> AppResult<bool>;

    fn save_verified(&self, profile: &UserProfile, phone_number: &str) -> AppResult<()>;

    /// Returns false if the user was already banned.
    fn ban(&self, user_id: i64, banned_by: Option<i64>) -> AppResult<bool>;

    /// Returns false if the user was not banned.
    fn unban(&self, user_id: i64) -> AppResult<bool>;

    /// Record (or re-open) a join request as pending.
    fn record_request(&self, user_id: i64, chat_id: i64, chat_title: Option<&str>) -> AppResult<()>;

    fn pending_requests(&self, user_id: i64) -> AppResult<Vec<JoinRequestRecord>>;

    /// Returns false if the request is unknown.
    fn set_request_status(&self, user_id: i64, chat_id: i64, status: JoinRequestStatus) -> AppResult<bool>;

    fn stats(&self) -> AppResult<StoreStats>;

    /// Verified phone number of a user who is not banned.
    fn verified_phone(&self, user_id: i64) -> AppResult<Option<String>> {
        Ok(self
            .verified_user(user_id)?
            .filter(|user| !user.is_banned)
            .map(|user| user.phone_number))
    }
}

/// SQLite-backed store; each call borrows one pooled connection.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl VerificationStore for SqliteStore {
    fn verified_user(&self, user_id: i64) -> AppResult<Option<VerifiedUser>> {
        let conn = get_connection(&self.pool)?;
        Ok(verified::get_verified_user(&conn, user_id)?)
    }

    fn is_banned(&self, user_id: i64) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(verified::is_banned(&conn, user_id)?)
    }

    fn save_verified(&self, profile: &UserProfile, phone_number: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        Ok(verified::upsert_verified_user(&conn, profile, phone_number)?)
    }

    fn ban(&self, user_id: i64, banned_by: Option<i64>) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(verified::ban_user(&conn, user_id, banned_by)?)
    }

    fn unban(&self, user_id: i64) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(verified::unban_user(&conn, user_id)?)
    }

    fn record_request(&self, user_id: i64, chat_id: i64, chat_title: Option<&str>) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        Ok(join_requests::record_join_request(&conn, user_id, chat_id, chat_title)?)
    }

    fn pending_requests(&self, user_id: i64) -> AppResult<Vec<JoinRequestRecord>> {
        let conn = get_connection(&self.pool)?;
        Ok(join_requests::pending_requests_for_user(&conn, user_id)?)
    }

    fn set_request_status(&self, user_id: i64, chat_id: i64, status: JoinRequestStatus) -> AppResult<bool> {
        let conn = get_connection(&self.pool)?;
        Ok(join_requests::update_join_request_status(&conn, user_id, chat_id, status)?)
    }

    fn stats(&self) -> AppResult<StoreStats> {
        let conn = get_connection(&self.pool)?;
        let (verified, banned) = verified::count_users(&conn)?;
        let (pending, approved, rejected) = join_requests::count_by_status(&conn)?;
        Ok(StoreStats {
            verified,
            banned,
            pending,
            approved,
            rejected,
        })
    }
}

/// Process-local store. State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i64, VerifiedUser>,
    banned: DashSet<i64>,
    requests: DashMap<(i64, i64), JoinRequestRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl VerificationStore for MemoryStore {
    fn verified_user(&self, user_id: i64) -> AppResult<Option<VerifiedUser>> {
        Ok(self.users.get(&user_id).map(|entry| {
            let mut user = entry.value().clone();
            user.is_banned = self.banned.contains(&user_id);
            user
        }))
    }

    fn is_banned(&self, user_id: i64) -> AppResult<bool> {
        Ok(self.banned.contains(&user_id))
    }

    fn save_verified(&self, profile: &UserProfile, phone_number: &str) -> AppResult<()> {
        self.users.insert(
            profile.user_id,
            VerifiedUser {
                user_id: profile.user_id,
                username: profile.username.clone(),
                first_name: profile.first_name.clone(),
                phone_number: phone_number.to_string(),
                verified_at: now_timestamp(),
                is_banned: false,
            },
        );
        Ok(())
    }

    fn ban(&self, user_id: i64, _banned_by: Option<i64>) -> AppResult<bool> {
        Ok(self.banned.insert(user_id))
    }

    fn unban(&self, user_id: i64) -> AppResult<bool> {
        Ok(self.banned.remove(&user_id).is_some())
    }

    fn record_request(&self, user_id: i64, chat_id: i64, chat_title: Option<&str>) -> AppResult<()> {
        let mut entry = self
            .requests
            .entry((user_id, chat_id))
            .or_insert_with(|| JoinRequestRecord {
                user_id,
                chat_id,
                chat_title: None,
                requested_at: String::new(),
                status: JoinRequestStatus::Pending,
            });
        if let Some(title) = chat_title {
            entry.chat_title = Some(title.to_string());
        }
        entry.requested_at = now_timestamp();
        entry.status = JoinRequestStatus::Pending;
        Ok(())
    }

    fn pending_requests(&self, user_id: i64) -> AppResult<Vec<JoinRequestRecord>> {
        let mut pending: Vec<JoinRequestRecord> = self
            .requests
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.status == JoinRequestStatus::Pending)
            .map(|entry| entry.value().clone())
            .collect();
        pending.sort_by(|a, b| (&a.requested_at, a.chat_id).cmp(&(&b.requested_at, b.chat_id)));
        Ok(pending)
    }

    fn set_request_status(&self, user_id: i64, chat_id: i64, status: JoinRequestStatus) -> AppResult<bool> {
        match self.requests.get_mut(&(user_id, chat_id)) {
            Some(mut entry) => {
                entry.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn stats(&self) -> AppResult<StoreStats> {
        let mut stats = StoreStats {
            verified: self
                .users
                .iter()
                .filter(|entry| !self.banned.contains(entry.key()))
                .count() as i64,
            banned: self.banned.len() as i64,
            ..StoreStats::default()
        };
        for entry in self.requests.iter() {
            match entry.status {
                JoinRequestStatus::Pending => stats.pending += 1,
                JoinRequestStatus::Approved => stats.approved += 1,
                JoinRequestStatus::Rejected => stats.rejected += 1,
            }
        }
        Ok(stats)
    }
}
