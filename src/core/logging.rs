//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the verification bot configuration

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::{self, BotSettings};

/// Parses a `LOG_LEVEL` value, falling back to `Info`.
fn parse_level(raw: Option<&str>) -> LevelFilter {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        Some("off") => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for both console and file output
///
/// The level is taken from `LOG_LEVEL` (default `info`). The log file is
/// appended to, so restarts keep the previous history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let level = parse_level(std::env::var("LOG_LEVEL").ok().as_deref());
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the verification bot configuration at application startup
///
/// Reports admin notification target, invite link, database location and
/// the Bot API endpoint so misconfigurations are visible in the first lines
/// of the log.
pub fn log_startup_configuration(settings: &BotSettings) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🇵🇭 Verification bot configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    log::info!("Database: {}", config::DATABASE_PATH.as_str());

    match settings.admin_chat() {
        Some(admin) => log::info!("✅ Admin notifications: {}", admin),
        None => log::warn!("⚠️  ADMIN_USER_ID / ADMIN_IDS not set - admin notifications disabled"),
    }
    log::info!("Admins allowed to run admin commands: {}", settings.admin_ids.len());

    match settings.invite_link.as_deref() {
        Some(link) => log::info!("✅ INVITE_LINK: {}", link),
        None => log::warn!("⚠️  INVITE_LINK not set - verified users will not receive an invite link"),
    }

    match config::bot_api::get_url() {
        Some(url) if config::bot_api::is_local() => log::info!("Using local Bot API server: {}", url),
        Some(url) => log::info!("Using Bot API URL: {}", url),
        None => log::info!("Using default Bot API (api.telegram.org)"),
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
