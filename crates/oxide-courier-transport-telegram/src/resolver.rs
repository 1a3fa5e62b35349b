//! Default username resolver backed by the Bot API `getChat` method.

use async_trait::async_trait;
use oxide_courier_core::{ChatResolver, ResolveError};
use teloxide::prelude::*;
use teloxide::types::Recipient;
use teloxide::{ApiError, RequestError};
use tracing::debug;

/// Resolves `@username` destinations by asking the Bot API about the chat.
///
/// The lookup runs with the token passed in by the courier, so one resolver
/// can serve couriers of several bots.
#[derive(Clone)]
pub struct BotApiResolver {
    client: reqwest::Client,
}

impl BotApiResolver {
    /// Create a resolver with an HTTP client configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: teloxide::net::client_from_env(),
        }
    }
}

impl Default for BotApiResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatResolver for BotApiResolver {
    async fn resolve(&self, token: &str, username: &str) -> Result<i64, ResolveError> {
        debug!(username = %username, "Resolving chat username via getChat");
        let bot = Bot::with_client(token, self.client.clone());
        match bot
            .get_chat(Recipient::ChannelUsername(username.to_string()))
            .await
        {
            Ok(chat) => Ok(chat.id.0),
            Err(RequestError::Api(ApiError::ChatNotFound)) => {
                Err(ResolveError::NotFound(username.to_string()))
            }
            Err(e) => Err(ResolveError::Backend(Box::new(e))),
        }
    }
}
