//! Verification handler with its store injected
//!
//! Wraps the pure `classify` with the state the bot keeps between updates:
//! already-verified phone numbers, bans, and the join-request ledger. Nothing
//! here talks to Telegram; the telegram layer turns the returned decisions
//! into Bot API calls and reports back through `settle`.

use std::sync::Arc;

use super::error::AppResult;
use super::verification::{classify, normalize_phone, Decision, JoinEvent};
use crate::storage::{JoinRequestRecord, JoinRequestStatus, UserProfile, VerificationStore};

/// Join request as delivered by the platform, reduced to what the verifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequestInfo {
    pub user_id: i64,
    pub chat_id: i64,
    pub chat_title: Option<String>,
}

/// Result of checking a shared contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactVerdict {
    pub decision: Decision,
    /// Normalized form of the shared number
    pub normalized_phone: String,
    /// Join requests of this user that were waiting for the phone number
    pub pending_requests: Vec<JoinRequestRecord>,
}

#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn VerificationStore>,
}

impl Verifier {
    pub fn new(store: Arc<dyn VerificationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn VerificationStore> {
        &self.store
    }

    /// Decide on an incoming join request.
    ///
    /// The request is recorded as pending first. Banned users are blocked
    /// outright; everyone else is classified on the phone number stored from
    /// an earlier verification, if any.
    pub fn evaluate_join(&self, request: &JoinRequestInfo) -> AppResult<Decision> {
        self.store
            .record_request(request.user_id, request.chat_id, request.chat_title.as_deref())?;

        if self.store.is_banned(request.user_id)? {
            log::info!(
                "Join request from banned user {} to chat {}",
                request.user_id,
                request.chat_id
            );
            return Ok(Decision::Block);
        }

        let phone = self.store.verified_phone(request.user_id)?;
        let event = JoinEvent::new(request.user_id, request.chat_id, phone);
        let decision = classify(&event);
        log::info!(
            "Join request user={} chat={} -> {}",
            request.user_id,
            request.chat_id,
            decision
        );
        Ok(decision)
    }

    /// Check a phone number the user shared about themselves.
    ///
    /// On `Approve` the normalized number is stored so future join requests
    /// are approved without asking again. Banned users are never stored.
    pub fn verify_contact(&self, profile: &UserProfile, phone_number: &str) -> AppResult<ContactVerdict> {
        let event = JoinEvent::from_contact(profile.user_id, phone_number);
        let normalized_phone = normalize_phone(phone_number);

        let decision = if self.store.is_banned(profile.user_id)? {
            Decision::Block
        } else {
            classify(&event)
        };

        if decision.is_approve() {
            self.store.save_verified(profile, &normalized_phone)?;
        }

        let pending_requests = match decision {
            Decision::Pending(_) => Vec::new(),
            _ => self.store.pending_requests(profile.user_id)?,
        };

        log::info!(
            "Contact from user {} ({}) -> {}, {} pending request(s)",
            profile.user_id,
            super::verification::mask_phone(phone_number),
            decision,
            pending_requests.len()
        );

        Ok(ContactVerdict {
            decision,
            normalized_phone,
            pending_requests,
        })
    }

    /// Record the outcome of applying a decision to a join request.
    /// `Pending` leaves the request open.
    pub fn settle(&self, user_id: i64, chat_id: i64, decision: &Decision) -> AppResult<()> {
        let status = match decision {
            Decision::Approve => JoinRequestStatus::Approved,
            Decision::Block => JoinRequestStatus::Rejected,
            Decision::Pending(_) => return Ok(()),
        };
        if !self.store.set_request_status(user_id, chat_id, status)? {
            log::warn!("No join request recorded for user {} in chat {}", user_id, chat_id);
        }
        Ok(())
    }
}
