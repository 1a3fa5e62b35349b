//! Resolution of `@username` chat identifiers to numeric chat ids.
//!
//! Only identifiers starting with `@` are resolved; numeric ids and any other
//! names are handed to the transport unchanged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::chat::ChatRef;
use crate::error::{CourierError, ResolveError, Result};

/// Looks up the numeric id behind a chat username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatResolver: Send + Sync {
    /// Resolve `username` (including its leading `@`) using the bot `token`.
    async fn resolve(&self, token: &str, username: &str) -> Result<i64, ResolveError>;
}

#[async_trait]
impl<R: ChatResolver + ?Sized> ChatResolver for Arc<R> {
    async fn resolve(&self, token: &str, username: &str) -> Result<i64, ResolveError> {
        (**self).resolve(token, username).await
    }
}

/// Replace a symbolic `chat` with its numeric id.
///
/// # Errors
///
/// Returns [`CourierError::Resolution`] if the resolver fails.
pub async fn resolve_chat(
    resolver: &dyn ChatResolver,
    token: &str,
    chat: ChatRef,
) -> Result<ChatRef> {
    let username = match chat {
        ChatRef::Name(name) if name.starts_with('@') => name,
        other => return Ok(other),
    };

    debug!(username = %username, "Resolving username to chat id");
    match resolver.resolve(token, &username).await {
        Ok(id) => {
            debug!(username = %username, chat_id = id, "Username resolved");
            Ok(ChatRef::Id(id))
        }
        Err(source) => {
            warn!(username = %username, error = %source, "Failed to resolve username");
            Err(CourierError::Resolution { username, source })
        }
    }
}

/// Resolver wrapper that remembers successful lookups for a while.
///
/// Failed lookups are not cached.
pub struct CachedResolver<R> {
    inner: R,
    cache: Cache<String, i64>,
}

impl<R: ChatResolver> CachedResolver<R> {
    /// Wrap `inner`, keeping up to `max_capacity` ids for `ttl`.
    #[must_use]
    pub fn new(inner: R, ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl<R: ChatResolver> ChatResolver for CachedResolver<R> {
    async fn resolve(&self, token: &str, username: &str) -> Result<i64, ResolveError> {
        if let Some(id) = self.cache.get(username).await {
            debug!(username, chat_id = id, "Username resolved from cache");
            return Ok(id);
        }

        let id = self.inner.resolve(token, username).await?;
        self.cache.insert(username.to_string(), id).await;
        Ok(id)
    }
}
