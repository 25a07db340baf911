//! Command handler implementations (/start, /status, /help and admin commands)

use teloxide::types::Message;

use super::types::{requester_from_user, HandlerDeps, HandlerError};
use crate::telegram::bot::{parse_user_id_arg, Command};
use crate::telegram::flow;
use crate::telegram::gateway::ReplyKeyboard;
use crate::telegram::messages;

/// Routes a parsed command to the verification flow.
pub(super) async fn handle_command(msg: &Message, cmd: Command, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(sender) = msg.from.as_ref().and_then(|user| requester_from_user(user, msg.chat.id.0)) else {
        log::debug!("Ignoring command without a sender in chat {}", msg.chat.id);
        return Ok(());
    };
    let gateway = deps.gateway.as_ref();
    let verifier = &deps.verifier;
    let settings = deps.settings.as_ref();

    match cmd {
        Command::Start => flow::start(gateway, verifier, &sender).await?,
        Command::Status => flow::status(gateway, verifier, &sender).await?,
        Command::Help => {
            gateway
                .send(sender.dm_chat_id, &messages::help(), ReplyKeyboard::Keep)
                .await?
        }
        Command::Ban(arg) => match parse_user_id_arg(&arg) {
            Some(target) => flow::ban(gateway, verifier, settings, &sender, target).await?,
            None => send_usage(deps, &sender, "ban").await?,
        },
        Command::Unban(arg) => match parse_user_id_arg(&arg) {
            Some(target) => flow::unban(gateway, verifier, settings, &sender, target).await?,
            None => send_usage(deps, &sender, "unban").await?,
        },
        Command::Stats => flow::stats(gateway, verifier, settings, &sender).await?,
    }
    Ok(())
}

async fn send_usage(deps: &HandlerDeps, sender: &flow::Requester, command: &str) -> Result<(), HandlerError> {
    let text = if deps.settings.is_admin(sender.user_id) {
        messages::usage(command)
    } else {
        messages::admin_only()
    };
    deps.gateway
        .send(sender.dm_chat_id, &text, ReplyKeyboard::Keep)
        .await?;
    Ok(())
}
