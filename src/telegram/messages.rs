//! User-facing and admin-facing message texts (Telegram HTML parse mode)
//!
//! Every value coming from users (names, chat titles, phone numbers) goes
//! through `escape` before it is interpolated.

use indoc::{formatdoc, indoc};
use teloxide::utils::html::escape;

use crate::storage::StoreStats;

/// Label of the reply-keyboard button that shares the user's own contact.
pub const CONTACT_BUTTON_LABEL: &str = "📱 I-Share ang Phone Number Ko";

fn display_name(first_name: &str) -> String {
    if first_name.trim().is_empty() {
        "there".to_string()
    } else {
        escape(first_name)
    }
}

fn username_tag(username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("@{}", escape(name)),
        _ => "no_username".to_string(),
    }
}

/// DM sent when a join request arrives from an unverified user.
pub fn verification_request(first_name: &str, chat_title: &str) -> String {
    formatdoc! {"
        🇵🇭 <b>Filipino Verification Required</b>

        Hi {name}! To join <b>{chat}</b>, please verify your Filipino status by sharing your Philippine phone number.

        <b>How to verify:</b>
        1. Tap the button below to share your phone number
        2. Only Philippine numbers (+63) are accepted
        3. You'll be approved automatically once verified

        <b>Your privacy:</b> your phone number is only used for verification.",
        name = display_name(first_name),
        chat = escape(chat_title),
    }
}

/// Reply to /start for users who are not verified yet.
pub fn start_prompt(first_name: &str) -> String {
    formatdoc! {"
        🇵🇭 <b>Filipino Verification</b>

        Hi {name}! Share your Philippine phone number with the button below to get verified.

        <b>Requirements:</b>
        • Philippine number (+63) only
        • It must be your own number

        Once verified, your join requests to our groups are approved automatically.",
        name = display_name(first_name),
    }
}

pub fn already_verified() -> String {
    indoc! {"
        ✅ You are already verified as a Filipino user! 🇵🇭

        You can join our groups and channels without additional verification."}
    .to_string()
}

/// DM sent after a join request was auto-approved.
pub fn welcome_approved(first_name: &str, chat_title: &str) -> String {
    formatdoc! {"
        🎉 <b>Welcome!</b> ✅

        Hi {name}, you've been approved to join <b>{chat}</b>!

        Your Filipino verification is confirmed. Enjoy the community! 🇵🇭",
        name = display_name(first_name),
        chat = escape(chat_title),
    }
}

pub fn contact_verified(first_name: &str, formatted_number: &str, approved_chats: usize, invite_link: Option<&str>) -> String {
    let mut text = formatdoc! {"
        ✅ <b>Verified!</b> 🇵🇭

        Welcome to the Filipino community, {name}!

        📱 <b>Verified number:</b> {number}
        🚀 <b>Benefit:</b> future join requests are approved automatically",
        name = display_name(first_name),
        number = escape(formatted_number),
    };

    if approved_chats > 0 {
        text.push_str(&format!("\n🎉 <b>Approved:</b> {} pending join request(s)", approved_chats));
    }
    if let Some(link) = invite_link {
        text.push_str(&format!("\n\n👉 <b>Join here:</b> {}", escape(link)));
    }
    text
}

pub fn contact_rejected(formatted_number: &str) -> String {
    formatdoc! {"
        ❌ <b>Invalid phone number!</b>

        • <b>Number:</b> {number}
        • <b>Expected:</b> Philippines 🇵🇭 (+63)

        Only Philippine numbers can join. If this is a mistake, contact the admin.

        Accepted formats:
        • +63 9XX XXX XXXX
        • 09XX XXX XXXX
        • 63 9XX XXX XXXX",
        number = escape(formatted_number),
    }
}

pub fn not_own_contact() -> String {
    "❌ Only your own phone number can be verified!".to_string()
}

pub fn contact_unreadable() -> String {
    "⚠️ The shared contact has no phone number. Please use the button below to share your own number.".to_string()
}

pub fn status_verified(first_name: &str, formatted_number: &str) -> String {
    formatdoc! {"
        ✅ <b>Verification Status: VERIFIED</b> 🇵🇭

        <b>User:</b> {name}
        <b>Phone:</b> {number}
        <b>Benefits:</b> auto-approval for our groups",
        name = display_name(first_name),
        number = escape(formatted_number),
    }
}

pub fn status_not_verified(first_name: &str) -> String {
    formatdoc! {"
        ❌ <b>Verification Status: NOT VERIFIED</b>

        <b>User:</b> {name}

        Use /start and share your Philippine phone number to get verified.",
        name = display_name(first_name),
    }
}

pub fn status_banned() -> String {
    "⛔ <b>Verification Status: BANNED</b>\n\nContact the admin if you think this is a mistake.".to_string()
}

pub fn help() -> String {
    indoc! {"
        🇵🇭 <b>Filipino Verification Bot Help</b>

        <b>Commands:</b>
        • /start - Start verification
        • /status - Check your verification status
        • /help - Show this help message

        <b>How it works:</b>
        1. Request to join one of our groups, or use /start
        2. Share your Philippine phone number
        3. Get approved automatically, now and for every future request

        <b>Supported formats:</b>
        • +63 9XX XXX XXXX
        • 09XX XXX XXXX
        • 63 9XX XXX XXXX

        <b>Need help?</b> Contact the admin."}
    .to_string()
}

pub fn admin_auto_approved(first_name: &str, username: Option<&str>, user_id: i64, chat_title: &str, chat_id: i64) -> String {
    formatdoc! {"
        ✅ <b>Auto-Approved Join Request</b>

        <b>User:</b> {name} ({tag})
        <b>ID:</b> <code>{user_id}</code>
        <b>Chat:</b> {chat} (<code>{chat_id}</code>)
        <b>Status:</b> verified Filipino user",
        name = display_name(first_name),
        tag = username_tag(username),
        chat = escape(chat_title),
    }
}

pub fn admin_new_verified(first_name: &str, username: Option<&str>, user_id: i64, formatted_number: &str) -> String {
    formatdoc! {"
        ✅ <b>New Verified User</b>

        <b>User:</b> {name} ({tag})
        <b>ID:</b> <code>{user_id}</code>
        <b>Phone:</b> {number}",
        name = display_name(first_name),
        tag = username_tag(username),
        number = escape(formatted_number),
    }
}

pub fn admin_contact_rejected(first_name: &str, username: Option<&str>, user_id: i64, formatted_number: &str) -> String {
    formatdoc! {"
        ⛔ <b>Rejected Phone Number</b>

        <b>User:</b> {name} ({tag})
        <b>ID:</b> <code>{user_id}</code>
        <b>Phone:</b> {number}",
        name = display_name(first_name),
        tag = username_tag(username),
        number = escape(formatted_number),
    }
}

pub fn stats(stats: &StoreStats) -> String {
    formatdoc! {"
        📊 <b>Verification Stats</b>

        <b>Verified users:</b> {verified}
        <b>Banned users:</b> {banned}

        <b>Join requests</b>
        • pending: {pending}
        • approved: {approved}
        • rejected: {rejected}",
        verified = stats.verified,
        banned = stats.banned,
        pending = stats.pending,
        approved = stats.approved,
        rejected = stats.rejected,
    }
}

pub fn admin_only() -> String {
    "⛔ This command is only available to admins.".to_string()
}

pub fn usage(command: &str) -> String {
    format!("Usage: <code>/{} &lt;user_id&gt;</code>", command)
}

pub fn banned(user_id: i64, declined: usize) -> String {
    format!("⛔ User <code>{}</code> banned, {} pending request(s) declined.", user_id, declined)
}

pub fn already_banned(user_id: i64) -> String {
    format!("User <code>{}</code> is already banned.", user_id)
}

pub fn unbanned(user_id: i64) -> String {
    format!("✅ User <code>{}</code> unbanned.", user_id)
}

pub fn not_banned(user_id: i64) -> String {
    format!("User <code>{}</code> is not banned.", user_id)
}
