//! [`BotTransport`] over the Telegram Bot API via `teloxide`.

use async_trait::async_trait;
use oxide_courier_core::{
    BotTransport, ChatAction, ChatRef, MediaOptions, MediaSource, ParseMode, SendOptions,
    TransportError, TransportResult, Venue,
};
use teloxide::payloads::setters::*;
use teloxide::payloads::{GetChat, GetChatMember, GetMe};
use teloxide::prelude::*;
use teloxide::requests::Payload;
use teloxide::types::{
    ChatAction as TgChatAction, FileId, InputFile, MessageId, ParseMode as TgParseMode, Recipient,
    ReplyParameters,
};

/// Apply caption, parse mode and silence to a media request.
macro_rules! with_media_options {
    ($req:expr, $options:expr) => {{
        let options: MediaOptions = $options;
        let mut req = $req;
        if let Some(caption) = options.caption {
            req = req.caption(caption);
        }
        if let Some(mode) = options.parse_mode {
            req = req.parse_mode(parse_mode(mode));
        }
        if options.disable_notification {
            req = req.disable_notification(true);
        }
        req
    }};
}

/// Apply parse mode, silence and reply target to a message request.
macro_rules! with_send_options {
    ($req:expr, $options:expr) => {{
        let options: SendOptions = $options;
        let mut req = $req;
        if options.disable_notification {
            req = req.disable_notification(true);
        }
        if let Some(id) = options.reply_to_message_id {
            req = req.reply_parameters(ReplyParameters::new(MessageId(id)));
        }
        req
    }};
}

/// The raw Telegram client used underneath the courier.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wrap an existing bot.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// The wrapped bot.
    #[must_use]
    pub const fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Map a courier destination to a Telegram recipient.
#[must_use]
pub fn recipient(chat: ChatRef) -> Recipient {
    match chat {
        ChatRef::Id(id) => Recipient::Id(ChatId(id)),
        ChatRef::Name(name) => Recipient::ChannelUsername(name),
    }
}

/// Map a media source to a Telegram upload.
///
/// # Errors
///
/// Returns a `TransportError` if a URL source does not parse.
pub fn input_file(source: MediaSource) -> TransportResult<InputFile> {
    match source {
        MediaSource::FileId(id) => Ok(InputFile::file_id(FileId(id))),
        MediaSource::Url(url) => url
            .parse::<reqwest::Url>()
            .map(InputFile::url)
            .map_err(|e| TransportError::message(format!("invalid media url '{url}': {e}"))),
        MediaSource::Path(path) => Ok(InputFile::file(path)),
        MediaSource::Memory { data, file_name } => {
            Ok(InputFile::memory(data).file_name(file_name))
        }
    }
}

const fn parse_mode(mode: ParseMode) -> TgParseMode {
    match mode {
        ParseMode::Html => TgParseMode::Html,
        ParseMode::MarkdownV2 => TgParseMode::MarkdownV2,
    }
}

const fn chat_action(action: ChatAction) -> TgChatAction {
    match action {
        ChatAction::Typing => TgChatAction::Typing,
        ChatAction::UploadPhoto => TgChatAction::UploadPhoto,
        ChatAction::UploadVideo => TgChatAction::UploadVideo,
        ChatAction::RecordVoice => TgChatAction::RecordVoice,
        ChatAction::UploadVoice => TgChatAction::UploadVoice,
        ChatAction::UploadDocument => TgChatAction::UploadDocument,
        ChatAction::ChooseSticker => TgChatAction::ChooseSticker,
        ChatAction::FindLocation => TgChatAction::FindLocation,
    }
}

#[async_trait]
impl BotTransport for TelegramTransport {
    type Message = Message;
    type Chat = <GetChat as Payload>::Output;
    type ChatMember = <GetChatMember as Payload>::Output;
    type Me = <GetMe as Payload>::Output;

    async fn send_message(
        &self,
        chat: ChatRef,
        text: String,
        options: SendOptions,
    ) -> TransportResult<Message> {
        let mut req = self.bot.send_message(recipient(chat), text);
        if let Some(mode) = options.parse_mode {
            req = req.parse_mode(parse_mode(mode));
        }
        with_send_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn forward_message(
        &self,
        chat: ChatRef,
        from_chat: ChatRef,
        message_id: i32,
    ) -> TransportResult<Message> {
        self.bot
            .forward_message(recipient(chat), recipient(from_chat), MessageId(message_id))
            .await
            .map_err(TransportError::new)
    }

    async fn send_photo(
        &self,
        chat: ChatRef,
        photo: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_photo(recipient(chat), input_file(photo)?);
        with_media_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_audio(
        &self,
        chat: ChatRef,
        audio: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_audio(recipient(chat), input_file(audio)?);
        with_media_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_document(
        &self,
        chat: ChatRef,
        document: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_document(recipient(chat), input_file(document)?);
        with_media_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_sticker(
        &self,
        chat: ChatRef,
        sticker: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        // Stickers carry no caption.
        let mut req = self.bot.send_sticker(recipient(chat), input_file(sticker)?);
        if options.disable_notification {
            req = req.disable_notification(true);
        }
        req.await.map_err(TransportError::new)
    }

    async fn send_video(
        &self,
        chat: ChatRef,
        video: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_video(recipient(chat), input_file(video)?);
        with_media_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_voice(
        &self,
        chat: ChatRef,
        voice: MediaSource,
        options: MediaOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_voice(recipient(chat), input_file(voice)?);
        with_media_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_location(
        &self,
        chat: ChatRef,
        latitude: f64,
        longitude: f64,
        options: SendOptions,
    ) -> TransportResult<Message> {
        let req = self
            .bot
            .send_location(recipient(chat), latitude, longitude);
        with_send_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_venue(
        &self,
        chat: ChatRef,
        venue: Venue,
        options: SendOptions,
    ) -> TransportResult<Message> {
        let req = self.bot.send_venue(
            recipient(chat),
            venue.latitude,
            venue.longitude,
            venue.title,
            venue.address,
        );
        with_send_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_game(
        &self,
        chat: ChatRef,
        game_short_name: String,
        options: SendOptions,
    ) -> TransportResult<Message> {
        let ChatRef::Id(id) = chat else {
            return Err(TransportError::message(format!(
                "games can only be sent to numeric chat ids, got '{chat}'"
            )));
        };
        let req = self.bot.send_game(ChatId(id), game_short_name);
        with_send_options!(req, options)
            .await
            .map_err(TransportError::new)
    }

    async fn send_chat_action(&self, chat: ChatRef, action: ChatAction) -> TransportResult<bool> {
        self.bot
            .send_chat_action(recipient(chat), chat_action(action))
            .await
            .map(|_| true)
            .map_err(TransportError::new)
    }

    async fn ban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool> {
        self.bot
            .ban_chat_member(recipient(chat), UserId(user_id))
            .await
            .map(|_| true)
            .map_err(TransportError::new)
    }

    async fn unban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool> {
        self.bot
            .unban_chat_member(recipient(chat), UserId(user_id))
            .await
            .map(|_| true)
            .map_err(TransportError::new)
    }

    async fn get_chat(&self, chat: ChatRef) -> TransportResult<Self::Chat> {
        self.bot
            .get_chat(recipient(chat))
            .await
            .map_err(TransportError::new)
    }

    async fn get_chat_administrators(
        &self,
        chat: ChatRef,
    ) -> TransportResult<Vec<Self::ChatMember>> {
        self.bot
            .get_chat_administrators(recipient(chat))
            .await
            .map_err(TransportError::new)
    }

    async fn get_chat_member_count(&self, chat: ChatRef) -> TransportResult<u32> {
        self.bot
            .get_chat_member_count(recipient(chat))
            .await
            .map_err(TransportError::new)
    }

    async fn get_chat_member(
        &self,
        chat: ChatRef,
        user_id: u64,
    ) -> TransportResult<Self::ChatMember> {
        self.bot
            .get_chat_member(recipient(chat), UserId(user_id))
            .await
            .map_err(TransportError::new)
    }

    async fn leave_chat(&self, chat: ChatRef) -> TransportResult<bool> {
        self.bot
            .leave_chat(recipient(chat))
            .await
            .map(|_| true)
            .map_err(TransportError::new)
    }

    async fn get_me(&self) -> TransportResult<Self::Me> {
        self.bot.get_me().await.map_err(TransportError::new)
    }

    async fn edit_message_text(
        &self,
        chat: ChatRef,
        message_id: i32,
        text: String,
        options: SendOptions,
    ) -> TransportResult<Message> {
        let mut req = self
            .bot
            .edit_message_text(recipient(chat), MessageId(message_id), text);
        if let Some(mode) = options.parse_mode {
            req = req.parse_mode(parse_mode(mode));
        }
        req.await.map_err(TransportError::new)
    }

    async fn delete_message(&self, chat: ChatRef, message_id: i32) -> TransportResult<bool> {
        self.bot
            .delete_message(recipient(chat), MessageId(message_id))
            .await
            .map(|_| true)
            .map_err(TransportError::new)
    }
}
