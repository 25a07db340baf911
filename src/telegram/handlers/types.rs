//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{User, UserId};

use crate::core::config::BotSettings;
use crate::core::verifier::Verifier;
use crate::telegram::flow::Requester;
use crate::telegram::gateway::MembershipGateway;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub verifier: Verifier,
    pub gateway: Arc<dyn MembershipGateway>,
    pub settings: Arc<BotSettings>,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        verifier: Verifier,
        gateway: Arc<dyn MembershipGateway>,
        settings: Arc<BotSettings>,
        bot_username: Option<String>,
        bot_id: UserId,
    ) -> Self {
        Self {
            verifier,
            gateway,
            settings,
            bot_username,
            bot_id,
        }
    }
}

/// Converts a Telegram user into the flow's `Requester`.
///
/// Returns `None` for ids that do not fit an `i64`.
pub fn requester_from_user(user: &User, dm_chat_id: i64) -> Option<Requester> {
    Some(Requester {
        user_id: i64::try_from(user.id.0).ok()?,
        first_name: user.first_name.clone(),
        username: user.username.clone(),
        is_bot: user.is_bot,
        dm_chat_id,
    })
}
