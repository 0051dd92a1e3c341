use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::time::sleep;

use zvonilka::core::{config, init_logger};
use zvonilka::storage::create_pool;
use zvonilka::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, Sessions};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration,
/// database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable is not set"));
    }

    run_bot().await
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;

    // Get bot information for invite deep links.
    // Retry if the Bot API is still initializing.
    let bot_info = {
        let mut attempt = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    attempt += 1;
                    if attempt >= config::startup::MAX_GET_ME_RETRIES {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            attempt,
                            e
                        ));
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in {} seconds...",
                        attempt,
                        config::startup::MAX_GET_ME_RETRIES,
                        e,
                        config::startup::GET_ME_RETRY_DELAY_SECS
                    );
                    sleep(config::startup::get_me_retry_delay()).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_info.id);

    // Register the command list in the Telegram UI
    setup_bot_commands(&bot).await?;

    // Create database connection pool
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    log::info!("Database ready at {}", config::DATABASE_PATH.as_str());

    // Per-user dialog state (name entry, search prompt)
    let sessions = Arc::new(Sessions::new());

    // Create the dispatcher handler tree
    let handler = schema(HandlerDeps::new(Arc::clone(&db_pool), Arc::clone(&sessions), bot_username));

    log::info!("Call links served from {}", config::APP_PUBLIC_BASE_URL.as_str());
    log::info!("Ready to receive updates!");

    // Long polling; pending updates accumulated while offline are dropped
    let listener = teloxide::update_listeners::Polling::builder(bot.clone())
        .drop_pending_updates()
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}
