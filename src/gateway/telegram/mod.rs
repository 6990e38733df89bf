mod client;
pub mod types;

pub use client::{MAX_MESSAGE_CHARS, TelegramClient, split_message};

use crate::{
    Result,
    config::TelegramConfig,
    gateway::{ChatGateway, command_addressee},
};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use types::IncomingText;

/// Long-polls the Bot API until `shutdown` fires. Each text message is handled
/// on its own task so one slow recommendation never blocks other chats.
pub async fn run(
    config: &TelegramConfig,
    gateway: Arc<ChatGateway>,
    shutdown: CancellationToken,
) -> Result<()> {
    let client = Arc::new(TelegramClient::new(config)?);
    let retry_delay = Duration::from_secs(config.retry_delay_secs);
    let mut offset: Option<i64> = None;
    let mut tasks = JoinSet::new();

    let bot_username = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        me = client.get_me() => match me {
            Ok(me) => me.username,
            Err(e) => {
                warn!("Could not fetch bot identity, answering every command: {}", e);
                None
            }
        },
    };

    info!(
        "Starting Telegram long-polling gateway as @{}",
        bot_username.as_deref().unwrap_or("unknown")
    );

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = client.get_updates(offset, config.poll_timeout_secs) => polled,
        };

        match polled {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(incoming) = update.into_incoming() {
                        if addressed_elsewhere(&incoming.text, bot_username.as_deref()) {
                            debug!("Ignoring command for another bot in chat {}", incoming.chat_id);
                            continue;
                        }
                        tasks.spawn(handle_incoming(
                            client.clone(),
                            gateway.clone(),
                            incoming,
                            shutdown.child_token(),
                        ));
                    }
                }
            }
            Err(e) => {
                warn!("Polling Telegram failed, retrying in {:?}: {}", retry_delay, e);
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                error!("Message task panicked: {}", e);
            }
        }
    }

    info!("Telegram gateway stopping, waiting for {} in-flight messages", tasks.len());
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("Message task panicked: {}", e);
        }
    }

    Ok(())
}

/// True for `/command@otherbot` when our own username is known. Telegram
/// usernames are case-insensitive.
fn addressed_elsewhere(text: &str, bot_username: Option<&str>) -> bool {
    match (command_addressee(text), bot_username) {
        (Some(addressee), Some(own)) => !addressee.eq_ignore_ascii_case(own),
        _ => false,
    }
}

async fn handle_incoming(
    client: Arc<TelegramClient>,
    gateway: Arc<ChatGateway>,
    incoming: IncomingText,
    cancel: CancellationToken,
) {
    let conversation_id = incoming.chat_id.to_string();
    let reply = gateway
        .handle(
            &conversation_id,
            incoming.first_name.as_deref(),
            &incoming.text,
            &cancel,
        )
        .await;

    if cancel.is_cancelled() {
        info!("Shutdown in progress, dropping reply for chat {}", incoming.chat_id);
        return;
    }

    if let Err(e) = client.send_message(incoming.chat_id, &reply.text).await {
        error!("Failed to deliver reply to chat {}: {}", incoming.chat_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_for_other_bots_are_ignored() {
        assert!(addressed_elsewhere("/start@otherbot", Some("cinebot")));
        assert!(!addressed_elsewhere("/start@CineBot", Some("cinebot")));
        assert!(!addressed_elsewhere("/start", Some("cinebot")));
        assert!(!addressed_elsewhere("quero um filme", Some("cinebot")));
        assert!(!addressed_elsewhere("/start@otherbot", None));
    }
}
