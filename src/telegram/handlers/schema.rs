//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatJoinRequest, Message};

use super::commands::handle_command;
use super::types::{requester_from_user, HandlerDeps, HandlerError};
use crate::core::verifier::JoinRequestInfo;
use crate::telegram::bot::{is_message_addressed_to_bot, Command};
use crate::telegram::flow::{self, SharedContact};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and can be used in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_join = deps.clone();
    let deps_contact = deps.clone();
    let deps_commands = deps;

    dptree::entry()
        .branch(join_request_handler(deps_join))
        // Contacts must be matched before commands: they carry no text
        .branch(contact_handler(deps_contact))
        .branch(command_handler(deps_commands))
}

/// Handler for chat join requests
fn join_request_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_chat_join_request().endpoint(move |request: ChatJoinRequest| {
        let deps = deps.clone();
        async move {
            let Some(requester) = requester_from_user(&request.from, request.user_chat_id.0) else {
                log::warn!("Join request with unsupported user id {}", request.from.id);
                return Ok(());
            };
            let info = JoinRequestInfo {
                user_id: requester.user_id,
                chat_id: request.chat.id.0,
                chat_title: request.chat.title().map(str::to_string),
            };

            log::info!(
                "Join request from user {} (@{}) to chat {}",
                requester.user_id,
                requester.username.as_deref().unwrap_or("-"),
                info.chat_id
            );

            if let Err(e) = flow::handle_join_request(
                deps.gateway.as_ref(),
                &deps.verifier,
                &deps.settings,
                &info,
                &requester,
            )
            .await
            {
                log::error!(
                    "Join request handling failed for user {} in chat {}: {}",
                    info.user_id,
                    info.chat_id,
                    e
                );
            }
            Ok(())
        }
    })
}

/// Handler for contacts shared in private chats
fn contact_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private() && msg.contact().is_some())
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                let (Some(contact), Some(sender)) = (
                    msg.contact(),
                    msg.from.as_ref().and_then(|user| requester_from_user(user, msg.chat.id.0)),
                ) else {
                    return Ok(());
                };

                let shared = SharedContact {
                    phone_number: contact.phone_number.clone(),
                    user_id: contact.user_id.and_then(|id| i64::try_from(id.0).ok()),
                };

                match flow::handle_contact(deps.gateway.as_ref(), &deps.verifier, &deps.settings, &sender, &shared)
                    .await
                {
                    Ok(outcome) => log::info!("Contact from user {} handled: {:?}", sender.user_id, outcome),
                    Err(e) => log::error!("Contact handling failed for user {}: {}", sender.user_id, e),
                }
                Ok(())
            }
        })
}

/// Handler for bot commands
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();

    Update::filter_message()
        .filter(move |msg: Message| {
            is_message_addressed_to_bot(&msg, deps_filter.bot_username.as_deref(), deps_filter.bot_id)
        })
        .branch(dptree::entry().filter_command::<Command>().endpoint(
            move |msg: Message, cmd: Command| {
                let deps = deps.clone();
                async move {
                    log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                    if let Err(e) = handle_command(&msg, cmd, &deps).await {
                        log::error!("Command failed in chat {}: {}", msg.chat.id, e);
                    }
                    Ok(())
                }
            },
        ))
}
