//! Destination identifiers and transport-agnostic request payloads.

use std::fmt;
use std::path::PathBuf;

/// Destination of a bot operation as supplied by the caller.
///
/// Strings that parse as an integer are treated as numeric ids, so
/// `"12345"` and `12345` address the same chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatRef {
    /// Canonical numeric chat id
    Id(i64),
    /// Any non-numeric reference, usually a `@username`
    Name(String),
}

impl ChatRef {
    /// Returns the `@name` form if this reference must be resolved first.
    #[must_use]
    pub fn symbolic_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) if name.starts_with('@') => Some(name),
            _ => None,
        }
    }

    /// Key under which sends to this destination are serialized.
    #[must_use]
    pub fn key(&self) -> DestinationKey {
        match self {
            Self::Id(id) => DestinationKey::Numeric(*id),
            Self::Name(name) => DestinationKey::Named(name.clone()),
        }
    }
}

impl From<i64> for ChatRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<i32> for ChatRef {
    fn from(id: i32) -> Self {
        Self::Id(i64::from(id))
    }
}

impl From<&str> for ChatRef {
    fn from(value: &str) -> Self {
        value
            .parse::<i64>()
            .map_or_else(|_| Self::Name(value.to_string()), Self::Id)
    }
}

impl From<String> for ChatRef {
    fn from(value: String) -> Self {
        match value.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(value),
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Queue partition key, computed only after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestinationKey {
    /// Resolved numeric chat id
    Numeric(i64),
    /// Name the resolver does not handle (no leading `@`)
    Named(String),
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Text formatting mode for message text and captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Telegram HTML subset
    Html,
    /// Telegram MarkdownV2
    MarkdownV2,
}

/// Options applied to every page of a text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Formatting mode
    pub parse_mode: Option<ParseMode>,
    /// Send silently
    pub disable_notification: bool,
    /// Message to reply to
    pub reply_to_message_id: Option<i32>,
}

/// Options for media sends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOptions {
    /// Caption shown under the media (ignored for stickers)
    pub caption: Option<String>,
    /// Formatting mode of the caption
    pub parse_mode: Option<ParseMode>,
    /// Send silently
    pub disable_notification: bool,
}

/// Where the bytes of a media upload come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// File already stored on the bot API servers
    FileId(String),
    /// Public URL fetched by the bot API
    Url(String),
    /// Local file uploaded by the transport
    Path(PathBuf),
    /// In-memory upload
    Memory {
        /// File contents
        data: Vec<u8>,
        /// File name reported to the API
        file_name: String,
    },
}

/// A venue, as sent by `send_venue`.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Venue name
    pub title: String,
    /// Venue address
    pub address: String,
}

/// Activity indicator shown to chat members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    /// Typing text
    Typing,
    /// Uploading a photo
    UploadPhoto,
    /// Uploading a video
    UploadVideo,
    /// Recording a voice note
    RecordVoice,
    /// Uploading a voice note
    UploadVoice,
    /// Uploading a document
    UploadDocument,
    /// Choosing a sticker
    ChooseSticker,
    /// Looking up a location
    FindLocation,
}
