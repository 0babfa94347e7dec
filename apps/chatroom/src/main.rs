//! Terminal chatroom on top of one shared variable.
//!
//! Reads messages from stdin, one per line; prints the room whenever a poll
//! tick observes a new log. EOF (ctrl-d) leaves the room.

#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use vaas_chat::{ChatMessage, ChatRoom};
use vaas_client::{ClientConfig, Credentials, VaasClient};

#[derive(Parser, Debug)]
struct Args {
    /// Origin of the VaaS service.
    #[arg(long, default_value = "https://api.variableasaservice.com")]
    server_url: String,
    /// API key authorizing access to the shared variable.
    #[arg(long)]
    api_key: String,
    /// Id of the variable holding the chat log.
    #[arg(long, default_value_t = 9)]
    variable_id: i64,
    /// Username shown next to your messages (at most 16 characters).
    #[arg(long)]
    username: String,
    /// How often to poll for new messages.
    #[arg(long, default_value_t = 3000)]
    poll_interval_ms: u64,
}

fn print_log(log: &[ChatMessage]) {
    println!("--- {} message(s) ---", log.len());
    for entry in log {
        let sent_at = chrono::DateTime::from_timestamp_millis(entry.time)
            .map_or_else(|| entry.time.to_string(), |at| at.to_rfc2822());
        println!("{}: \"{}\" sent at {}", entry.user, entry.message, sent_at);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = VaasClient::new(ClientConfig::new(&args.server_url))
        .context("configure client")?;
    client
        .authenticate(Credentials::ApiKey(args.api_key.clone()))
        .await
        .context("store api key")?;
    let client = Arc::new(client);

    let mut room = ChatRoom::new(client, args.variable_id)
        .with_poll_interval(Duration::from_millis(args.poll_interval_ms));
    room.enter(&args.username).context("enter chatroom")?;
    println!("entered as {}; type a message and press enter (ctrl-d to leave)", args.username);

    let mut messages = room.messages().context("subscribe to messages")?;
    let printer = tokio::spawn(async move {
        while messages.changed().await.is_ok() {
            print_log(&messages.borrow().clone());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if let Err(error) = room.send(message).await {
            tracing::error!(%error, "message not sent");
        }
    }

    room.leave();
    printer.abort();
    println!("left the chatroom");
    Ok(())
}
