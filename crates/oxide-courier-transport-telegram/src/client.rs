use crate::config::BotSettings;
use crate::resolver::BotApiResolver;
use crate::transport::TelegramTransport;
use oxide_courier_core::{Courier, CourierOptions};
use std::sync::Arc;
use teloxide::Bot;

/// A courier talking to the Telegram Bot API.
pub type TelegramCourier = Courier<TelegramTransport>;

/// Build a courier for `bot`, resolving usernames through `getChat` unless
/// `options` supply another resolver.
#[must_use]
pub fn connect(settings: &BotSettings, bot: Bot, options: CourierOptions) -> TelegramCourier {
    Courier::builder(
        settings.telegram.telegram_token.clone(),
        TelegramTransport::new(bot),
        Arc::new(BotApiResolver::new()),
    )
    .options(options)
    .settings(settings.courier.as_ref().clone())
    .build()
}
