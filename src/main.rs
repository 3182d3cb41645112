//! Meshline CLI entry point.
//!
//! Provides `preview`, `send`, `reschedule`, and `channels` subcommands for
//! composing event notifications, delivering them to Slack, announcing
//! appointment changes, and inspecting the channel listing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use meshline::config::{load_config, Config};
use meshline::event::Event;
use meshline::logging;
use meshline::message::compose;
use meshline::slack::{ChatApi, Delivery, DeliveryHandle, Notifier, SlackClient};

/// Meshline, Slack notifications for community mesh network operations.
#[derive(Parser)]
#[command(name = "meshline", version, about)]
struct Cli {
    /// Path to the configuration file (defaults to ~/.meshline/config.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Compose an event into a message payload and print it, without sending.
    Preview {
        /// Path to the event JSON file.
        #[arg(long)]
        event: PathBuf,
    },
    /// Compose an event and deliver it to its bound channel.
    Send {
        /// Path to the event JSON file.
        #[arg(long)]
        event: PathBuf,
    },
    /// Announce a rescheduled appointment by editing the original message.
    Reschedule {
        /// Path to the appointment event JSON file.
        #[arg(long)]
        event: PathBuf,
        /// Channel id the original message was posted to.
        #[arg(long)]
        channel: String,
        /// Timestamp of the original message.
        #[arg(long)]
        ts: String,
    },
    /// List channels visible to the bot, or resolve one by name.
    Channels {
        /// Channel name to resolve; omitted lists all channels.
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; load it before logging so RUST_LOG can come from it.
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Preview { event } => handle_preview(&event),
        Command::Send { event } => handle_send(config_path, &event).await,
        Command::Reschedule {
            event,
            channel,
            ts,
        } => handle_reschedule(config_path, &event, channel, ts).await,
        Command::Channels { name } => handle_channels(config_path, name).await,
    }
}

/// Compose an event and print the payload JSON to stdout.
fn handle_preview(event_path: &Path) -> anyhow::Result<()> {
    let event = read_event(event_path)?;
    let payload = compose(&event)?;
    let json =
        serde_json::to_string_pretty(&payload).context("failed to serialize message payload")?;
    println!("{json}");
    Ok(())
}

/// Compose an event and deliver it to its bound channel.
///
/// Prints the delivery outcome to stdout: the handle JSON when the
/// message posted, so a later reschedule can reference it, or a one-line
/// skipped notice.
async fn handle_send(config_path: Option<&Path>, event_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let event = read_event(event_path)?;
    let notifier = build_notifier(&config)?;

    match notifier.announce(&event).await? {
        Delivery::Sent(handle) => {
            let json = serde_json::to_string_pretty(&handle)
                .context("failed to serialize delivery handle")?;
            println!("{json}");
        }
        Delivery::Skipped => println!("skipped: channel not found"),
    }
    Ok(())
}

/// Edit a previously sent appointment message and note the change in its
/// thread.
async fn handle_reschedule(
    config_path: Option<&Path>,
    event_path: &Path,
    channel: String,
    ts: String,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let event = read_event(event_path)?;
    let Event::Appointment { appointment } = event else {
        anyhow::bail!("reschedule expects an appointment event");
    };

    let notifier = build_notifier(&config)?;
    let handle = DeliveryHandle {
        channel_id: channel,
        ts,
    };
    notifier.reschedule(&appointment, &handle).await?;
    info!(channel = %handle.channel_id, ts = %handle.ts, "reschedule announced");
    Ok(())
}

/// List channels, or resolve a single channel by name.
async fn handle_channels(config_path: Option<&Path>, name: Option<String>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let client = build_client(&config)?;
    let channels = client.list_channels().await?;

    if let Some(name) = name {
        // Same rule as delivery: first listed match wins.
        let Some(channel) = channels.into_iter().find(|c| c.name == name) else {
            anyhow::bail!("channel not found: {name}");
        };
        println!("{}\t{}", channel.id, channel.name);
    } else {
        for channel in &channels {
            println!("{}\t{}", channel.id, channel.name);
        }
    }
    Ok(())
}

/// Parse an event from a JSON file.
fn read_event(path: &Path) -> anyhow::Result<Event> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let event = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event from {}", path.display()))?;
    Ok(event)
}

/// Build a Slack client with the configured API base and bot token.
fn build_client(config: &Config) -> anyhow::Result<SlackClient> {
    let token = std::env::var(&config.slack.bot_token_env).with_context(|| {
        format!(
            "bot token not found in environment variable {}",
            config.slack.bot_token_env
        )
    })?;
    Ok(SlackClient::new(config.slack.api_base.clone(), token))
}

/// Build a notifier over the configured Slack client and channel bindings.
fn build_notifier(config: &Config) -> anyhow::Result<Notifier> {
    let api: Arc<dyn ChatApi> = Arc::new(build_client(config)?);
    Ok(Notifier::new(api, config.channels.clone()))
}
