//! archon-bot - reference host wiring the framework to an in-process gateway.

mod config;
mod demo;

use crate::config::Config;
use anyhow::Context;
use bot_core::Bot;
use chat_client::{ChatUser, Gateway, MemoryGateway, UserId};
use config_store::{ConfigMirror, DEFAULT_FILE_NAME};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting archon-bot...");

    // The in-process gateway stands in for a real platform client.
    let gateway = Arc::new(MemoryGateway::new(ChatUser {
        id: UserId(1),
        name: "archon".into(),
        is_bot: true,
    }));

    let bot = Bot::builder(gateway.clone(), PathBuf::from(&config.bot.data_dir))
        .prefix(&config.bot.command_prefix)
        .allow_space_after_prefix(config.bot.allow_space_after_prefix)
        .default_level(config.bot.default_permission_level)
        .context(demo::demo_context(gateway.clone()))
        .build();

    info!(
        "Registered {} global commands across {} user-defined contexts",
        bot.commands().all().len(),
        bot.contexts().user_defined().len()
    );
    info!("Command prefix: {}", bot.prefix());

    // Mirror the demo context's configuration if a mirror directory is set.
    let _mirror = match &config.bot.mirror_dir {
        Some(dir) => {
            let store = bot
                .configs()
                .store_for("ctx-demo", DEFAULT_FILE_NAME)
                .await
                .context("Failed to open demo context configuration")?;
            info!("Mirroring configuration to {dir}");
            Some(ConfigMirror::spawn(store, dir))
        }
        None => None,
    };

    let mut messages = Box::pin(gateway.messages());
    let mut console = BufReader::new(tokio::io::stdin()).lines();
    let mut console_open = true;

    info!("Listening for messages. Console commands are read from stdin.");

    // Main message loop
    loop {
        tokio::select! {
            Some(message) = messages.next() => {
                // The bot never answers itself or other bots.
                if message.author.id == gateway.current_user().id || message.author.is_bot {
                    continue;
                }
                match bot.dispatch_message(&message).await {
                    Ok(outcome) => debug!("Dispatch outcome: {outcome:?}"),
                    Err(err) => error!("Dispatch failed: {err}"),
                }
            }
            line = console.next_line(), if console_open => {
                match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        match bot.dispatch_console(line).await {
                            Ok(outcome) => debug!("Console outcome: {outcome:?}"),
                            Err(err) => error!("Console dispatch failed: {err}"),
                        }
                    }
                    Ok(None) => {
                        info!("Console input closed.");
                        console_open = false;
                    }
                    Err(err) => {
                        error!("Console read failed: {err}");
                        console_open = false;
                    }
                }
            }
            _ = bot.shutdown().signalled() => {
                info!("Shutdown command received");
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    bot.finalize().await;
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
