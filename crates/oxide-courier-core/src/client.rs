//! The courier: a [`BotTransport`] with ordering, paging and username
//! resolution layered on top.
//!
//! | Operation | Resolved | Queued | Paged |
//! |---|---|---|---|
//! | `send_message` | yes | yes | yes |
//! | `send_photo`, `send_audio`, `send_document`, `send_sticker`, `send_video`, `send_voice`, `send_location`, `send_venue`, `send_game` | yes | yes | |
//! | `forward_message`, `send_chat_action`, `kick_chat_member`, `unban_chat_member`, `get_chat`, `get_chat_administrators`, `get_chat_members_count`, `get_chat_member`, `leave_chat` | yes | | |
//! | `get_me`, `edit_message_text`, `delete_message` | | | |
//!
//! Queued operations start immediately and return a [`Deferred`]; their call
//! order is their delivery order for each chat.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::admission::AdmissionGate;
use crate::chat::{ChatAction, ChatRef, MediaOptions, MediaSource, SendOptions, Venue};
use crate::config::{CourierOptions, CourierSettings};
use crate::error::{CourierError, Result};
use crate::moderation::{self, Removal};
use crate::pager::{self, TextDelivery};
use crate::queue::{Deferred, SendQueue};
use crate::resolver::{resolve_chat, CachedResolver, ChatResolver};
use crate::transport::BotTransport;

/// Bot client that keeps per-chat send order, pages long texts and resolves
/// `@username` destinations.
///
/// Cloning is cheap; clones share queues and transport.
///
/// # Ordering
///
/// All queued operations of one courier pass a single admission point in
/// call order, whatever chat they address. A `@name` lookup that is slow or
/// hangs therefore holds back every later queued send, on every chat, until
/// it settles. Once admitted, sends to different chats run concurrently.
pub struct Courier<T: BotTransport> {
    transport: Arc<T>,
    token: Arc<str>,
    resolver: Arc<dyn ChatResolver>,
    queue: SendQueue,
    admission: Arc<AdmissionGate>,
}

impl<T: BotTransport> Clone for Courier<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            token: Arc::clone(&self.token),
            resolver: Arc::clone(&self.resolver),
            queue: self.queue.clone(),
            admission: Arc::clone(&self.admission),
        }
    }
}

/// Builder for [`Courier`].
pub struct CourierBuilder<T: BotTransport> {
    token: String,
    transport: T,
    resolver: Arc<dyn ChatResolver>,
    options: CourierOptions,
    settings: CourierSettings,
}

impl<T: BotTransport> CourierBuilder<T> {
    /// Apply caller options (e.g. a custom `resolve_chat_id`).
    #[must_use]
    pub fn options(mut self, options: CourierOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply loaded settings.
    #[must_use]
    pub fn settings(mut self, settings: CourierSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Finish the courier.
    #[must_use]
    pub fn build(self) -> Courier<T> {
        let mut resolver = self.options.resolve_chat_id.unwrap_or(self.resolver);
        if let Some(ttl) = self.settings.resolve_cache_ttl() {
            debug!(
                ttl_secs = ttl.as_secs(),
                max_size = self.settings.resolve_cache_max_size,
                "Caching username resolutions"
            );
            resolver = Arc::new(CachedResolver::new(
                resolver,
                ttl,
                self.settings.resolve_cache_max_size,
            ));
        }

        Courier {
            transport: Arc::new(self.transport),
            token: self.token.into(),
            resolver,
            queue: SendQueue::new(),
            admission: Arc::new(AdmissionGate::new()),
        }
    }
}

impl<T: BotTransport> Courier<T> {
    /// Start building a courier around `transport`.
    ///
    /// `default_resolver` is used unless the options supply `resolve_chat_id`.
    pub fn builder(
        token: impl Into<String>,
        transport: T,
        default_resolver: Arc<dyn ChatResolver>,
    ) -> CourierBuilder<T> {
        CourierBuilder {
            token: token.into(),
            transport,
            resolver: default_resolver,
            options: CourierOptions::default(),
            settings: CourierSettings::default(),
        }
    }

    /// Courier with default options and settings.
    pub fn new(
        token: impl Into<String>,
        transport: T,
        default_resolver: Arc<dyn ChatResolver>,
    ) -> Self {
        Self::builder(token, transport, default_resolver).build()
    }

    /// The raw transport, bypassing every courier guarantee.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The per-chat send queues.
    #[must_use]
    pub fn queue(&self) -> &SendQueue {
        &self.queue
    }

    async fn resolve(&self, chat: ChatRef) -> Result<ChatRef> {
        resolve_chat(self.resolver.as_ref(), &self.token, chat).await
    }

    /// Resolve, then queue `operation` under the resolved chat.
    ///
    /// Admission happens before this returns, so entries reach the queue in
    /// call order even when resolutions finish out of order.
    fn queued<R, F, Fut>(&self, chat: ChatRef, operation: F) -> Deferred<R>
    where
        R: Send + 'static,
        F: FnOnce(Arc<T>, ChatRef) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let mut ticket = self.admission.admit();
        if chat.symbolic_name().is_none() && ticket.is_ready() {
            return self.enqueue(chat, operation);
        }

        let (settle, deferred) = Deferred::pair();
        let this = self.clone();
        tokio::spawn(async move {
            let resolved = AssertUnwindSafe(this.resolve(chat)).catch_unwind().await;
            ticket.wait_turn().await;
            let outcome = match resolved {
                Ok(Ok(chat)) => {
                    let queued = this.enqueue(chat, operation);
                    drop(ticket);
                    queued.await
                }
                Ok(Err(err)) => {
                    drop(ticket);
                    Err(err)
                }
                Err(_) => {
                    warn!("Chat resolution panicked, dropping the queued request");
                    drop(ticket);
                    Err(CourierError::Cancelled)
                }
            };
            let _ = settle.send(outcome);
        });
        deferred
    }

    fn enqueue<R, F, Fut>(&self, chat: ChatRef, operation: F) -> Deferred<R>
    where
        R: Send + 'static,
        F: FnOnce(Arc<T>, ChatRef) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        self.queue
            .enqueue(chat.key(), move || operation(transport, chat))
    }

    /// Send a text message, paging it when it is too long.
    pub fn send_message(
        &self,
        chat: impl Into<ChatRef>,
        text: impl Into<String>,
        options: SendOptions,
    ) -> Deferred<TextDelivery<T::Message>> {
        let text = text.into();
        self.queued(chat.into(), move |transport, chat| async move {
            pager::send_paged(text, |page| {
                transport.send_message(chat.clone(), page, options.clone())
            })
            .await
        })
    }

    /// Send a photo.
    pub fn send_photo(
        &self,
        chat: impl Into<ChatRef>,
        photo: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_photo(chat, photo, options).await?)
        })
    }

    /// Send an audio file.
    pub fn send_audio(
        &self,
        chat: impl Into<ChatRef>,
        audio: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_audio(chat, audio, options).await?)
        })
    }

    /// Send a general file.
    pub fn send_document(
        &self,
        chat: impl Into<ChatRef>,
        document: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_document(chat, document, options).await?)
        })
    }

    /// Send a sticker.
    pub fn send_sticker(
        &self,
        chat: impl Into<ChatRef>,
        sticker: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_sticker(chat, sticker, options).await?)
        })
    }

    /// Send a video.
    pub fn send_video(
        &self,
        chat: impl Into<ChatRef>,
        video: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_video(chat, video, options).await?)
        })
    }

    /// Send a voice note.
    pub fn send_voice(
        &self,
        chat: impl Into<ChatRef>,
        voice: MediaSource,
        options: MediaOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_voice(chat, voice, options).await?)
        })
    }

    /// Send a point on the map.
    pub fn send_location(
        &self,
        chat: impl Into<ChatRef>,
        latitude: f64,
        longitude: f64,
        options: SendOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport
                .send_location(chat, latitude, longitude, options)
                .await?)
        })
    }

    /// Send a venue.
    pub fn send_venue(
        &self,
        chat: impl Into<ChatRef>,
        venue: Venue,
        options: SendOptions,
    ) -> Deferred<T::Message> {
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_venue(chat, venue, options).await?)
        })
    }

    /// Send a game.
    pub fn send_game(
        &self,
        chat: impl Into<ChatRef>,
        game_short_name: impl Into<String>,
        options: SendOptions,
    ) -> Deferred<T::Message> {
        let game_short_name = game_short_name.into();
        self.queued(chat.into(), move |transport, chat| async move {
            Ok(transport.send_game(chat, game_short_name, options).await?)
        })
    }

    /// Forward a message into `chat`. Only `chat` is resolved.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn forward_message(
        &self,
        chat: impl Into<ChatRef>,
        from_chat: impl Into<ChatRef>,
        message_id: i32,
    ) -> Result<T::Message> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self
            .transport
            .forward_message(chat, from_chat.into(), message_id)
            .await?)
    }

    /// Show an activity indicator.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn send_chat_action(
        &self,
        chat: impl Into<ChatRef>,
        action: ChatAction,
    ) -> Result<bool> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.send_chat_action(chat, action).await?)
    }

    /// Remove a member; with `ban == false` they may rejoin.
    ///
    /// # Errors
    ///
    /// Returns a resolution error, a transport error when banning, or a
    /// composite step error when kicking without ban.
    pub async fn kick_chat_member(
        &self,
        chat: impl Into<ChatRef>,
        user_id: u64,
        ban: bool,
    ) -> Result<Removal> {
        let chat = self.resolve(chat.into()).await?;
        moderation::remove_participant(self.transport.as_ref(), chat, user_id, ban).await
    }

    /// Lift a ban.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn unban_chat_member(&self, chat: impl Into<ChatRef>, user_id: u64) -> Result<bool> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.unban_chat_member(chat, user_id).await?)
    }

    /// Fetch chat information.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn get_chat(&self, chat: impl Into<ChatRef>) -> Result<T::Chat> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.get_chat(chat).await?)
    }

    /// List chat administrators.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn get_chat_administrators(
        &self,
        chat: impl Into<ChatRef>,
    ) -> Result<Vec<T::ChatMember>> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.get_chat_administrators(chat).await?)
    }

    /// Count chat members.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn get_chat_members_count(&self, chat: impl Into<ChatRef>) -> Result<u32> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.get_chat_member_count(chat).await?)
    }

    /// Fetch one chat member.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn get_chat_member(
        &self,
        chat: impl Into<ChatRef>,
        user_id: u64,
    ) -> Result<T::ChatMember> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.get_chat_member(chat, user_id).await?)
    }

    /// Leave a group or channel.
    ///
    /// # Errors
    ///
    /// Returns a resolution or transport error.
    pub async fn leave_chat(&self, chat: impl Into<ChatRef>) -> Result<bool> {
        let chat = self.resolve(chat.into()).await?;
        Ok(self.transport.leave_chat(chat).await?)
    }

    /// Describe the bot account.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn get_me(&self) -> Result<T::Me> {
        Ok(self.transport.get_me().await?)
    }

    /// Replace the text of a sent message.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn edit_message_text(
        &self,
        chat: impl Into<ChatRef>,
        message_id: i32,
        text: impl Into<String>,
        options: SendOptions,
    ) -> Result<T::Message> {
        Ok(self
            .transport
            .edit_message_text(chat.into(), message_id, text.into(), options)
            .await?)
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn delete_message(&self, chat: impl Into<ChatRef>, message_id: i32) -> Result<bool> {
        Ok(self
            .transport
            .delete_message(chat.into(), message_id)
            .await?)
    }
}
