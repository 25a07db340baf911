use crate::core::config::BotSettings;
use crate::telegram::gateway::{MembershipGateway, ReplyKeyboard};

/// Sends a notice to the admin chat, if one is configured.
///
/// Failures are logged and swallowed: a missing admin notice must never
/// undo or block a verification.
pub async fn notify_admin(gateway: &dyn MembershipGateway, settings: &BotSettings, text: &str) {
    let Some(admin_chat) = settings.admin_chat() else {
        log::debug!("No admin chat configured, skipping notice");
        return;
    };

    if let Err(e) = gateway.send(admin_chat, text, ReplyKeyboard::Keep).await {
        log::error!("Failed to send admin notice to {}: {}", admin_chat, e);
    }
}
