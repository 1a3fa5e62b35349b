#![deny(missing_docs)]
//! Telegram transport adapter for Oxide Courier.

/// Courier construction for a Telegram bot.
pub mod client;
/// Telegram transport configuration.
pub mod config;
/// `getChat`-based username resolution.
pub mod resolver;
/// Telegram runtime entrypoint.
pub mod runner;
/// `BotTransport` implementation over teloxide.
pub mod transport;

pub use client::{connect, TelegramCourier};
pub use resolver::BotApiResolver;
pub use transport::TelegramTransport;
