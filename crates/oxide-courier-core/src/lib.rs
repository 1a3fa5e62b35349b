#![deny(missing_docs)]
//! Oxide Courier core library.
//!
//! Ordering, paging and username resolution for bot API clients.

/// Call-order admission for queued sends.
pub mod admission;
/// Chat identifiers and request payloads.
pub mod chat;
/// The courier facade.
pub mod client;
/// Configuration management.
pub mod config;
/// Error types.
pub mod error;
/// Kick without ban.
pub mod moderation;
/// Paging of long texts.
pub mod pager;
/// Per-chat send queues.
pub mod queue;
/// Username resolution.
pub mod resolver;
/// The underlying transport contract.
pub mod transport;

pub use chat::{
    ChatAction, ChatRef, DestinationKey, MediaOptions, MediaSource, ParseMode, SendOptions, Venue,
};
pub use client::{Courier, CourierBuilder};
pub use config::{CourierOptions, CourierSettings};
pub use error::{CourierError, ModerationStep, ResolveError, TransportError};
pub use moderation::Removal;
pub use pager::TextDelivery;
pub use queue::Deferred;
pub use resolver::{CachedResolver, ChatResolver};
pub use transport::{BotTransport, TransportResult};
