use crate::client::{connect, TelegramCourier};
use crate::config::BotSettings;
use oxide_courier_core::{CourierError, CourierOptions, Removal, SendOptions, TextDelivery};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Commands understood by the bot.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the command list
    #[command(description = "Show this help.")]
    Help,
    /// Remove the replied-to user, letting them rejoin
    #[command(description = "Kick the author of the replied message.")]
    Kick,
    /// Remove the replied-to user for good
    #[command(description = "Ban the author of the replied message.")]
    Ban,
}

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let courier = Arc::new(connect(&settings, bot.clone(), CourierOptions::default()));
    info!(
        "Courier initialized (resolve cache: {:?}).",
        settings.courier.resolve_cache_ttl()
    );

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![courier, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
}

/// Whether the sender of `msg` may run moderation commands.
fn is_admin(msg: &Message, settings: &BotSettings) -> bool {
    msg.from
        .as_ref()
        .is_some_and(|u| settings.telegram.admin_users().contains(&u.id.0))
}

async fn reply(courier: &TelegramCourier, msg: &Message, text: impl Into<String>) {
    let options = SendOptions {
        reply_to_message_id: Some(msg.id.0),
        ..SendOptions::default()
    };
    if let Err(e) = courier.send_message(msg.chat.id.0, text, options).await {
        error!("Failed to reply in chat {}: {}", msg.chat.id.0, e);
    }
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    courier: Arc<TelegramCourier>,
    settings: Arc<BotSettings>,
) -> Result<(), teloxide::RequestError> {
    match cmd {
        Command::Help => reply(&courier, &msg, Command::descriptions().to_string()).await,
        Command::Kick | Command::Ban => {
            let ban = matches!(cmd, Command::Ban);
            handle_removal(&courier, &msg, &settings, ban).await;
        }
    }
    respond(())
}

async fn handle_removal(
    courier: &TelegramCourier,
    msg: &Message,
    settings: &BotSettings,
    ban: bool,
) {
    if !is_admin(msg, settings) {
        reply(courier, msg, "Only bot admins can do that.").await;
        return;
    }
    let Some(target) = msg.reply_to_message().and_then(|r| r.from.as_ref()) else {
        reply(courier, msg, "Reply to a message of the user to remove.").await;
        return;
    };

    match courier.kick_chat_member(msg.chat.id.0, target.id.0, ban).await {
        Ok(Removal::Banned(_)) => {
            info!("Banned user {} from chat {}", target.id.0, msg.chat.id.0);
            reply(courier, msg, format!("{} was banned.", target.first_name)).await;
        }
        Ok(Removal::Kicked { .. }) => {
            info!("Kicked user {} from chat {}", target.id.0, msg.chat.id.0);
            reply(courier, msg, format!("{} was kicked.", target.first_name)).await;
        }
        Err(CourierError::CompositeStep { step, source }) => {
            warn!("Kick of user {} stopped at {} step: {}", target.id.0, step, source);
            reply(courier, msg, format!("Kick failed at the {step} step.")).await;
        }
        Err(e) => {
            warn!("Removal of user {} failed: {}", target.id.0, e);
            reply(courier, msg, "Could not remove that user.").await;
        }
    }
}

async fn handle_text(
    msg: Message,
    courier: Arc<TelegramCourier>,
) -> Result<(), teloxide::RequestError> {
    let Some(text) = msg.text() else {
        return respond(());
    };
    let options = SendOptions {
        reply_to_message_id: Some(msg.id.0),
        ..SendOptions::default()
    };

    // Echo through the courier so long texts are paged in order.
    match courier.send_message(msg.chat.id.0, text, options).await {
        Ok(TextDelivery::Paged(pages)) => {
            info!("Echoed {} pages to chat {}", pages.len(), msg.chat.id.0);
        }
        Ok(TextDelivery::Single(_)) => {}
        Err(e) => error!("Echo to chat {} failed: {}", msg.chat.id.0, e),
    }
    respond(())
}
