use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: pinoy_gate.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "pinoy_gate.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: pinoy-gate.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "pinoy-gate.log".to_string()));

/// Community invite link sent to users after a successful verification
/// Read from INVITE_LINK environment variable
pub static INVITE_LINK: Lazy<Option<String>> = Lazy::new(|| non_empty_var("INVITE_LINK"));

/// Webhook URL for Telegram updates
/// Read from WEBHOOK_URL environment variable
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("WEBHOOK_URL"));

/// Local port the webhook listener binds to
/// Read from WEBHOOK_PORT environment variable
/// Default: 8443
pub static WEBHOOK_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEBHOOK_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8443)
});

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Upper bound for a single backoff sleep (in seconds)
    pub const MAX_BACKOFF_SECS: u64 = 60;

    /// Maximum number of `getMe` attempts while the Bot API is still starting
    pub const STARTUP_MAX_RETRIES: u32 = 60;

    /// Delay between `getMe` attempts on startup (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Database configuration
pub mod database {
    use super::Duration;

    /// Maximum number of pooled SQLite connections
    pub const POOL_MAX_SIZE: u32 = 8;

    /// SQLite busy timeout applied to every connection (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 30;

    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Admin user ID for direct messages (verification notices)
    /// Read from ADMIN_USER_ID or fallback to first ADMIN_IDS entry
    /// Defaults to 0 if not set (no admin notifications)
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| ADMIN_IDS.first().copied())
            .unwrap_or(0)
    });
}

/// Bot API server configuration utilities
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok().filter(|url| !url.trim().is_empty())
    }

    /// Returns true if using a local Bot API server (not api.telegram.org).
    pub fn is_local() -> bool {
        get_url().map(|url| !url.contains("api.telegram.org")).unwrap_or(false)
    }
}

/// Runtime settings captured once at startup and handed to the handlers.
///
/// Handlers never read the environment directly; tests build this struct by hand.
#[derive(Debug, Clone, Default)]
pub struct BotSettings {
    /// All user ids allowed to run admin commands
    pub admin_ids: Vec<i64>,
    /// Chat that receives verification notices (0 = disabled)
    pub admin_chat_id: i64,
    /// Invite link sent after a successful verification
    pub invite_link: Option<String>,
}

impl BotSettings {
    /// Builds the settings from the environment-backed statics above.
    pub fn from_env() -> Self {
        let admin_chat_id = *admin::ADMIN_USER_ID;
        let mut admin_ids = admin::ADMIN_IDS.clone();
        if admin_chat_id != 0 && !admin_ids.contains(&admin_chat_id) {
            admin_ids.push(admin_chat_id);
        }

        Self {
            admin_ids,
            admin_chat_id,
            invite_link: INVITE_LINK.clone(),
        }
    }

    /// Returns true if the user may run admin commands.
    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id != 0 && self.admin_ids.contains(&user_id)
    }

    /// Chat id that should receive admin notices, if configured.
    pub fn admin_chat(&self) -> Option<i64> {
        (self.admin_chat_id != 0).then_some(self.admin_chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids_mixed_separators() {
        assert_eq!(admin::parse_admin_ids("1, 2 3\n4\tx"), vec![1, 2, 3, 4]);
        assert!(admin::parse_admin_ids("").is_empty());
    }

    #[test]
    fn test_bot_settings_admin_checks() {
        let settings = BotSettings {
            admin_ids: vec![10, 20],
            admin_chat_id: 10,
            invite_link: None,
        };
        assert!(settings.is_admin(20));
        assert!(!settings.is_admin(30));
        assert!(!settings.is_admin(0));
        assert_eq!(settings.admin_chat(), Some(10));
        assert_eq!(BotSettings::default().admin_chat(), None);
    }
}
