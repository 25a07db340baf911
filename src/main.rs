use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::update_listeners::{webhooks, Polling};
use tokio::time::sleep;

use pinoy_gate::cli::{check_phone, render_check, Cli, Commands};
use pinoy_gate::core::{config, init_logger, log_startup_configuration, AppError, BotSettings, Verifier};
use pinoy_gate::storage::{create_pool, MemoryStore, SqliteStore, VerificationStore};
use pinoy_gate::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramGateway};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // `check` is an offline tool: no logger, no .env, just the answer on stdout
    if let Some(Commands::Check { phone, json }) = &cli.command {
        println!("{}", render_check(&check_phone(phone), *json)?);
        return Ok(());
    }

    // Log panics from the dispatcher instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { webhook, ephemeral }) => {
            log::info!("Running bot (webhook: {}, ephemeral: {})", webhook, ephemeral);
            run_bot(webhook, ephemeral).await
        }
        Some(Commands::Check { .. }) => Ok(()),
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(false, false).await
        }
    }
}

/// Builds the verification store: SQLite by default, in-memory with `--ephemeral`.
fn open_store(ephemeral: bool) -> Result<Arc<dyn VerificationStore>> {
    if ephemeral {
        log::warn!("Using in-memory store: verified users are lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(&config::DATABASE_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    log::info!("Database ready at {}", config::DATABASE_PATH.as_str());
    Ok(Arc::new(SqliteStore::new(Arc::new(pool))))
}

/// Runs the bot until shutdown
async fn run_bot(use_webhook: bool, ephemeral: bool) -> Result<()> {
    let bot_init_start = std::time::Instant::now();
    log::info!("Starting bot...");

    let webhook_url = match (use_webhook, config::WEBHOOK_URL.clone()) {
        (false, _) => None,
        (true, Some(url)) => Some(url::Url::parse(&url).map_err(AppError::from)?),
        (true, None) => {
            return Err(AppError::Config("--webhook requires WEBHOOK_URL to be set".to_string()).into());
        }
    };

    let bot = create_bot()?;

    // Get bot information to check mentions
    // Retry if Bot API is still initializing (returns "restart" error)
    let bot_info = {
        let startup_max_retries = config::retry::STARTUP_MAX_RETRIES;
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out")
                        || err_str.contains("Connection refused");

                    startup_retry += 1;
                    if startup_retry >= startup_max_retries || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in {} seconds...",
                        startup_retry,
                        startup_max_retries,
                        err_str,
                        config::retry::STARTUP_RETRY_DELAY_SECS
                    );
                    sleep(Duration::from_secs(config::retry::STARTUP_RETRY_DELAY_SECS)).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    let bot_id = bot_info.id;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let settings = Arc::new(BotSettings::from_env());
    log_startup_configuration(&settings);

    let verifier = Verifier::new(open_store(ephemeral)?);
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let handler_deps = HandlerDeps::new(verifier, gateway, settings, bot_username, bot_id);

    // Create the dispatcher handler tree
    let handler = schema(handler_deps);

    if let Some(url) = webhook_url {
        log::info!("Starting bot in webhook mode at {} (port {})", url, *config::WEBHOOK_PORT);
        let addr = ([0, 0, 0, 0], *config::WEBHOOK_PORT).into();
        let listener = webhooks::axum(bot.clone(), webhooks::Options::new(addr, url)).await?;
        log::info!("Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the webhook listener"),
            )
            .await;
        return Ok(());
    }

    log::info!("Starting bot in long polling mode");
    log::info!("Bot initialization complete in {:.2}s", bot_init_start.elapsed().as_secs_f64());

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    // Run the dispatcher with retry logic
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Run the dispatcher in a separate task to isolate panics
        let handle = tokio::spawn(async move {
            // Drop updates queued while the bot was offline
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);

                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Retrying dispatcher connection after panic (attempt {}/{})...",
                    retry_count,
                    max_retries
                );
                exponential_backoff(retry_count).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }

        // Add a delay between retries to avoid overwhelming the API
        sleep(config::retry::dispatcher_delay()).await;
    }

    Ok(())
}

/// Exponential backoff delay for retries, capped at `MAX_BACKOFF_SECS`
async fn exponential_backoff(retry_count: u32) {
    sleep(backoff_delay(retry_count)).await;
}

fn backoff_delay(retry_count: u32) -> Duration {
    let secs = config::retry::EXPONENTIAL_BACKOFF_BASE
        .saturating_pow(retry_count)
        .min(config::retry::MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}
