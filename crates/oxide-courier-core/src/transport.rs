//! The underlying bot transport: a fixed catalog of asynchronous operations.
//!
//! The courier never changes what an individual operation does; it only
//! decides when it runs, which chat id it receives, and how long text is cut.

use async_trait::async_trait;

use crate::chat::{ChatAction, ChatRef, MediaOptions, MediaSource, SendOptions, Venue};
use crate::error::TransportError;

/// Result of a single transport call.
pub type TransportResult<T> = Result<T, TransportError>;

/// Operations offered by the raw bot API client.
///
/// Every method taking a [`ChatRef`] receives it as its first argument, which
/// is what lets the courier resolve and queue by destination.
#[async_trait]
pub trait BotTransport: Send + Sync + 'static {
    /// A sent or edited message
    type Message: Send + 'static;
    /// Chat information returned by `get_chat`
    type Chat: Send + 'static;
    /// Chat member information
    type ChatMember: Send + 'static;
    /// The bot's own account
    type Me: Send + 'static;

    /// Send a text message.
    async fn send_message(
        &self,
        chat: ChatRef,
        text: String,
        options: SendOptions,
    ) -> TransportResult<Self::Message>;

    /// Forward a message from another chat.
    async fn forward_message(
        &self,
        chat: ChatRef,
        from_chat: ChatRef,
        message_id: i32,
    ) -> TransportResult<Self::Message>;

    /// Send a photo.
    async fn send_photo(
        &self,
        chat: ChatRef,
        photo: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send an audio file.
    async fn send_audio(
        &self,
        chat: ChatRef,
        audio: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a general file.
    async fn send_document(
        &self,
        chat: ChatRef,
        document: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a sticker.
    async fn send_sticker(
        &self,
        chat: ChatRef,
        sticker: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a video.
    async fn send_video(
        &self,
        chat: ChatRef,
        video: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a voice note.
    async fn send_voice(
        &self,
        chat: ChatRef,
        voice: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a point on the map.
    async fn send_location(
        &self,
        chat: ChatRef,
        latitude: f64,
        longitude: f64,
        options: SendOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a venue.
    async fn send_venue(
        &self,
        chat: ChatRef,
        venue: Venue,
        options: SendOptions,
    ) -> TransportResult<Self::Message>;

    /// Send a game.
    async fn send_game(
        &self,
        chat: ChatRef,
        game_short_name: String,
        options: SendOptions,
    ) -> TransportResult<Self::Message>;

    /// Show an activity indicator.
    async fn send_chat_action(&self, chat: ChatRef, action: ChatAction) -> TransportResult<bool>;

    /// Remove a member and ban them from rejoining.
    async fn ban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool>;

    /// Lift a ban.
    async fn unban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool>;

    /// Fetch chat information.
    async fn get_chat(&self, chat: ChatRef) -> TransportResult<Self::Chat>;

    /// List chat administrators.
    async fn get_chat_administrators(
        &self,
        chat: ChatRef,
    ) -> TransportResult<Vec<Self::ChatMember>>;

    /// Count chat members.
    async fn get_chat_member_count(&self, chat: ChatRef) -> TransportResult<u32>;

    /// Fetch one chat member.
    async fn get_chat_member(
        &self,
        chat: ChatRef,
        user_id: u64,
    ) -> TransportResult<Self::ChatMember>;

    /// Leave a group or channel.
    async fn leave_chat(&self, chat: ChatRef) -> TransportResult<bool>;

    /// Describe the bot account.
    async fn get_me(&self) -> TransportResult<Self::Me>;

    /// Replace the text of a sent message.
    async fn edit_message_text(
        &self,
        chat: ChatRef,
        message_id: i32,
        text: String,
        options: SendOptions,
    ) -> TransportResult<Self::Message>;

    /// Delete a message.
    async fn delete_message(&self, chat: ChatRef, message_id: i32) -> TransportResult<bool>;
}
