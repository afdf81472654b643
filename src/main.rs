#![allow(missing_docs)]

//! Namewatch binary entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use namewatch::config::Config;
use namewatch::subscriber::UpdateSubscriber;
use namewatch::supervisor::{self, Supervisor};
use namewatch::telegram::{BotApi, Gateway};
use namewatch::watcher::NameChangeNotifier;

/// Watch Telegram group chats and announce member display-name changes.
#[derive(Debug, Parser)]
#[command(name = "namewatch", version, about)]
struct Cli {
    /// Process updates queued while the bot was offline instead of
    /// discarding them.
    #[arg(long)]
    keep_backlog: bool,

    /// Long-poll timeout for getUpdates, in seconds.
    #[arg(long)]
    poll_timeout_secs: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let mut config = Config::load().context("failed to load configuration")?;
    if cli.keep_backlog {
        config.drop_pending_updates = false;
    }
    if let Some(timeout) = cli.poll_timeout_secs {
        config.poll_timeout_secs = timeout;
    }

    namewatch::logging::init(&config.log_filter);

    info!("namewatch starting");

    let gateway: Arc<dyn Gateway> = Arc::new(BotApi::new(&config.bot_token));
    let notifier = NameChangeNotifier::new(Arc::clone(&gateway));
    let subscriber = UpdateSubscriber::new(
        gateway,
        config.poll_timeout_secs,
        config.drop_pending_updates,
    );

    let shutdown = supervisor::spawn_ctrl_c_listener();
    let mut supervisor = Supervisor::new(subscriber, notifier, shutdown);

    supervisor.run().await.context("subscription terminated")?;

    info!("namewatch stopped");
    Ok(())
}
