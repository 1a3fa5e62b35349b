//! Kick without ban.
//!
//! The bot API only knows how to ban a member. Removing someone while still
//! allowing them back in is a ban immediately followed by an unban.

use tracing::debug;

use crate::chat::ChatRef;
use crate::error::{CourierError, ModerationStep, Result};
use crate::transport::BotTransport;

/// Outcome of [`remove_participant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The member was removed and stays banned
    Banned(bool),
    /// The member was removed and the ban lifted again
    Kicked {
        /// Result of the ban call
        ban: bool,
        /// Result of the unban call
        unban: bool,
    },
}

/// Remove `user_id` from `chat`, keeping the ban only if `permanent_ban`.
///
/// The unban step is never attempted when the ban fails.
///
/// # Errors
///
/// With `permanent_ban` the transport error is returned as is. Otherwise a
/// [`CourierError::CompositeStep`] names the step that failed.
pub async fn remove_participant<T: BotTransport + ?Sized>(
    transport: &T,
    chat: ChatRef,
    user_id: u64,
    permanent_ban: bool,
) -> Result<Removal> {
    if permanent_ban {
        debug!(chat_id = %chat, user_id, "Kicking and banning user");
        return Ok(Removal::Banned(
            transport.ban_chat_member(chat, user_id).await?,
        ));
    }

    debug!(chat_id = %chat, user_id, "Kicking user");
    let ban = transport
        .ban_chat_member(chat.clone(), user_id)
        .await
        .map_err(|source| CourierError::CompositeStep {
            step: ModerationStep::Ban,
            source,
        })?;

    debug!(chat_id = %chat, user_id, "Unbanning user");
    let unban = transport
        .unban_chat_member(chat, user_id)
        .await
        .map_err(|source| CourierError::CompositeStep {
            step: ModerationStep::Unban,
            source,
        })?;

    Ok(Removal::Kicked { ban, unban })
}
