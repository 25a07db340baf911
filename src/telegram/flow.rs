//! Verification flow: turns verifier decisions into moderation calls and DMs.
//!
//! Every function takes plain values instead of teloxide updates; the
//! handlers in `handlers/` unpack the update and call in here.

use crate::core::config::BotSettings;
use crate::core::error::AppResult;
use crate::core::verification::{format_international, Decision};
use crate::core::verifier::{JoinRequestInfo, Verifier};
use crate::storage::UserProfile;
use crate::telegram::gateway::{MembershipGateway, ReplyKeyboard};
use crate::telegram::messages;
use crate::telegram::notifications::notify_admin;

/// The Telegram user behind an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub first_name: String,
    pub username: Option<String>,
    pub is_bot: bool,
    /// Chat that replies go to. For commands this is the chat the command
    /// was sent in, which may be a group.
    pub dm_chat_id: i64,
}

impl Requester {
    /// The user's private chat, whatever chat the update came from.
    /// On Telegram a private chat id equals the user id.
    pub fn private_chat(&self) -> i64 {
        self.user_id
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            username: self.username.clone(),
            first_name: Some(self.first_name.clone()).filter(|name| !name.is_empty()),
        }
    }
}

/// Contact attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedContact {
    pub phone_number: String,
    /// Telegram user the contact belongs to, when known
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Phone accepted; carries the number of join requests approved along with it
    Verified { approved_requests: usize },
    /// Phone refused; carries the number of join requests declined
    Rejected { declined_requests: usize },
    /// The contact belongs to somebody else
    NotOwnContact,
    /// No usable phone number; the user was asked again
    AwaitingPhone,
}

/// Handles a join request and returns the decision that was applied.
///
/// Bots and admins skip verification. If the verification DM cannot be
/// delivered (the user never started the bot) the request is declined,
/// since nobody could complete it.
pub async fn handle_join_request(
    gateway: &dyn MembershipGateway,
    verifier: &Verifier,
    settings: &BotSettings,
    request: &JoinRequestInfo,
    requester: &Requester,
) -> AppResult<Decision> {
    let chat_title = request.chat_title.as_deref().unwrap_or("the group");

    if requester.is_bot || settings.is_admin(requester.user_id) {
        log::info!(
            "Auto-approving {} {} for chat {}",
            if requester.is_bot { "bot" } else { "admin" },
            requester.user_id,
            request.chat_id
        );
        verifier
            .store()
            .record_request(request.user_id, request.chat_id, request.chat_title.as_deref())?;
        gateway.approve(request.chat_id, request.user_id).await?;
        verifier.settle(request.user_id, request.chat_id, &Decision::Approve)?;
        return Ok(Decision::Approve);
    }

    let decision = verifier.evaluate_join(request)?;
    match &decision {
        Decision::Approve => {
            gateway.approve(request.chat_id, request.user_id).await?;
            verifier.settle(request.user_id, request.chat_id, &decision)?;

            let welcome = messages::welcome_approved(&requester.first_name, chat_title);
            if let Err(e) = gateway
                .send(requester.dm_chat_id, &welcome, ReplyKeyboard::Keep)
                .await
            {
                log::warn!("Could not send welcome to {}: {}", requester.user_id, e);
            }

            let notice = messages::admin_auto_approved(
                &requester.first_name,
                requester.username.as_deref(),
                requester.user_id,
                chat_title,
                request.chat_id,
            );
            notify_admin(gateway, settings, &notice).await;
            Ok(decision)
        }
        Decision::Block => {
            gateway.decline(request.chat_id, request.user_id).await?;
            verifier.settle(request.user_id, request.chat_id, &decision)?;
            Ok(decision)
        }
        Decision::Pending(reason) => {
            let text = messages::verification_request(&requester.first_name, chat_title);
            let keyboard = ReplyKeyboard::RequestContact(messages::CONTACT_BUTTON_LABEL.to_string());
            match gateway.send(requester.dm_chat_id, &text, keyboard).await {
                Ok(()) => {
                    log::info!("Asked user {} for a phone number ({})", requester.user_id, reason);
                    Ok(decision)
                }
                Err(e) => {
                    log::warn!(
                        "Cannot DM user {} ({}), declining request to {}",
                        requester.user_id,
                        e,
                        request.chat_id
                    );
                    gateway.decline(request.chat_id, request.user_id).await?;
                    verifier.settle(request.user_id, request.chat_id, &Decision::Block)?;
                    Ok(Decision::Block)
                }
            }
        }
    }
}

/// Handles a contact shared in the private chat.
pub async fn handle_contact(
    gateway: &dyn MembershipGateway,
    verifier: &Verifier,
    settings: &BotSettings,
    sender: &Requester,
    contact: &SharedContact,
) -> AppResult<ContactOutcome> {
    if contact.user_id != Some(sender.user_id) {
        log::warn!("User {} shared a contact that is not their own", sender.user_id);
        gateway
            .send(sender.dm_chat_id, &messages::not_own_contact(), ReplyKeyboard::Remove)
            .await?;
        return Ok(ContactOutcome::NotOwnContact);
    }

    let verdict = verifier.verify_contact(&sender.profile(), &contact.phone_number)?;
    let formatted = format_international(&verdict.normalized_phone);

    match verdict.decision {
        Decision::Approve => {
            let mut approved_requests = 0;
            for pending in &verdict.pending_requests {
                match gateway.approve(pending.chat_id, sender.user_id).await {
                    Ok(()) => {
                        verifier.settle(sender.user_id, pending.chat_id, &Decision::Approve)?;
                        approved_requests += 1;
                    }
                    Err(e) => log::warn!(
                        "Failed to approve pending request of {} in {}: {}",
                        sender.user_id,
                        pending.chat_id,
                        e
                    ),
                }
            }

            let text = messages::contact_verified(
                &sender.first_name,
                &formatted,
                approved_requests,
                settings.invite_link.as_deref(),
            );
            gateway.send(sender.dm_chat_id, &text, ReplyKeyboard::Remove).await?;

            let notice = messages::admin_new_verified(
                &sender.first_name,
                sender.username.as_deref(),
                sender.user_id,
                &formatted,
            );
            notify_admin(gateway, settings, &notice).await;
            Ok(ContactOutcome::Verified { approved_requests })
        }
        Decision::Block => {
            let mut declined_requests = 0;
            for pending in &verdict.pending_requests {
                match gateway.decline(pending.chat_id, sender.user_id).await {
                    Ok(()) => {
                        verifier.settle(sender.user_id, pending.chat_id, &Decision::Block)?;
                        declined_requests += 1;
                    }
                    Err(e) => log::warn!(
                        "Failed to decline pending request of {} in {}: {}",
                        sender.user_id,
                        pending.chat_id,
                        e
                    ),
                }
            }

            let text = if verifier.store().is_banned(sender.user_id)? {
                messages::status_banned()
            } else {
                messages::contact_rejected(&formatted)
            };
            gateway.send(sender.dm_chat_id, &text, ReplyKeyboard::Remove).await?;

            let notice = messages::admin_contact_rejected(
                &sender.first_name,
                sender.username.as_deref(),
                sender.user_id,
                &formatted,
            );
            notify_admin(gateway, settings, &notice).await;
            Ok(ContactOutcome::Rejected { declined_requests })
        }
        Decision::Pending(_) => {
            let keyboard = ReplyKeyboard::RequestContact(messages::CONTACT_BUTTON_LABEL.to_string());
            gateway
                .send(sender.dm_chat_id, &messages::contact_unreadable(), keyboard)
                .await?;
            Ok(ContactOutcome::AwaitingPhone)
        }
    }
}

/// `/start`: offers the contact button unless the user is already verified.
///
/// Always answers in the private chat: the contact keyboard is only
/// accepted there.
pub async fn start(gateway: &dyn MembershipGateway, verifier: &Verifier, sender: &Requester) -> AppResult<()> {
    if verifier.store().verified_phone(sender.user_id)?.is_some() {
        gateway
            .send(sender.private_chat(), &messages::already_verified(), ReplyKeyboard::Remove)
            .await
    } else {
        let keyboard = ReplyKeyboard::RequestContact(messages::CONTACT_BUTTON_LABEL.to_string());
        gateway
            .send(sender.private_chat(), &messages::start_prompt(&sender.first_name), keyboard)
            .await
    }
}

/// `/status`: reports verified, banned or not verified.
///
/// The reply carries the verified number, so it never goes to a group.
pub async fn status(gateway: &dyn MembershipGateway, verifier: &Verifier, sender: &Requester) -> AppResult<()> {
    let text = match verifier.store().verified_user(sender.user_id)? {
        Some(user) if user.is_banned => messages::status_banned(),
        Some(user) => messages::status_verified(&sender.first_name, &format_international(&user.phone_number)),
        None if verifier.store().is_banned(sender.user_id)? => messages::status_banned(),
        None => messages::status_not_verified(&sender.first_name),
    };
    gateway.send(sender.private_chat(), &text, ReplyKeyboard::Keep).await
}

/// Admin command that bans a user and declines their open join requests.
pub async fn ban(
    gateway: &dyn MembershipGateway,
    verifier: &Verifier,
    settings: &BotSettings,
    admin: &Requester,
    target: i64,
) -> AppResult<()> {
    if !settings.is_admin(admin.user_id) {
        return gateway
            .send(admin.dm_chat_id, &messages::admin_only(), ReplyKeyboard::Keep)
            .await;
    }

    if !verifier.store().ban(target, Some(admin.user_id))? {
        return gateway
            .send(admin.dm_chat_id, &messages::already_banned(target), ReplyKeyboard::Keep)
            .await;
    }
    log::info!("Admin {} banned user {}", admin.user_id, target);

    let mut declined = 0;
    for request in &verifier.store().pending_requests(target)? {
        match gateway.decline(request.chat_id, target).await {
            Ok(()) => {
                verifier.settle(target, request.chat_id, &Decision::Block)?;
                declined += 1;
            }
            Err(e) => log::warn!("Failed to decline request of {} in {}: {}", target, request.chat_id, e),
        }
    }

    gateway
        .send(admin.dm_chat_id, &messages::banned(target, declined), ReplyKeyboard::Keep)
        .await
}

/// Admin command that lifts a ban. A previously verified number becomes valid again.
pub async fn unban(
    gateway: &dyn MembershipGateway,
    verifier: &Verifier,
    settings: &BotSettings,
    admin: &Requester,
    target: i64,
) -> AppResult<()> {
    if !settings.is_admin(admin.user_id) {
        return gateway
            .send(admin.dm_chat_id, &messages::admin_only(), ReplyKeyboard::Keep)
            .await;
    }

    let text = if verifier.store().unban(target)? {
        log::info!("Admin {} unbanned user {}", admin.user_id, target);
        messages::unbanned(target)
    } else {
        messages::not_banned(target)
    };
    gateway.send(admin.dm_chat_id, &text, ReplyKeyboard::Keep).await
}

pub async fn stats(
    gateway: &dyn MembershipGateway,
    verifier: &Verifier,
    settings: &BotSettings,
    admin: &Requester,
) -> AppResult<()> {
    let text = if settings.is_admin(admin.user_id) {
        messages::stats(&verifier.store().stats()?)
    } else {
        messages::admin_only()
    };
    gateway.send(admin.dm_chat_id, &text, ReplyKeyboard::Keep).await
}
