//! Paging of oversized text messages.
//!
//! Texts of [`MAX_TEXT_LENGTH`] characters or more are cut into consecutive
//! pieces, each prefixed with a `[i/N] ` label and sent one after another.
//! Lengths are counted in `char`s, so a page never splits a code point.

use std::future::Future;

use tracing::debug;

use crate::error::{CourierError, Result};
use crate::transport::TransportResult;

/// Maximum length of a message text accepted without paging.
pub const MAX_TEXT_LENGTH: usize = 4096;

/// Characters reserved on every page for its `[i/N] ` label.
pub const HEADER_RESERVE: usize = 8;

/// Largest page count the two-digit label can express.
pub const MAX_PAGES: usize = 99;

/// One labeled fragment of a long text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based position
    pub index: usize,
    /// Number of pages in the whole text
    pub total: usize,
    /// The fragment, without label
    pub body: String,
}

impl Page {
    /// The text actually sent for this page.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}/{}] {}", self.index, self.total, self.body)
    }
}

/// Outcome of a text send: one message, or one per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDelivery<M> {
    /// The text fit into a single message
    Single(M),
    /// The text was paged; results are in page order
    Paged(Vec<M>),
}

impl<M> TextDelivery<M> {
    /// Number of messages the text was delivered as.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Paged(messages) => messages.len(),
        }
    }

    /// True only for a paged delivery that produced no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `text` is long enough to be paged.
#[must_use]
pub fn needs_paging(text: &str) -> bool {
    text.chars().count() >= MAX_TEXT_LENGTH
}

/// Cut `text` into labeled pages.
///
/// # Errors
///
/// Returns [`CourierError::PagingLimitExceeded`] with the computed page
/// bodies when more than [`MAX_PAGES`] pages would be needed.
pub fn split_pages(text: &str) -> Result<Vec<Page>> {
    let bodies = chunk_chars(text, MAX_TEXT_LENGTH - HEADER_RESERVE);

    if bodies.len() > MAX_PAGES {
        debug!(
            pages = bodies.len(),
            max_pages = MAX_PAGES,
            "Paging resulted in more pages than allowed"
        );
        return Err(CourierError::PagingLimitExceeded { pages: bodies });
    }

    let total = bodies.len();
    Ok(bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| Page {
            index: i + 1,
            total,
            body,
        })
        .collect())
}

/// Send `text` through `send`, paging it when it is too long.
///
/// Short texts go through untouched. Pages are sent strictly one after
/// another and the first failing page aborts the rest.
///
/// # Errors
///
/// Returns [`CourierError::PagingLimitExceeded`] before any call when the
/// text needs too many pages, or the first transport error.
pub async fn send_paged<M, F, Fut>(text: String, mut send: F) -> Result<TextDelivery<M>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = TransportResult<M>>,
{
    if !needs_paging(&text) {
        return Ok(TextDelivery::Single(send(text).await?));
    }

    let pages = split_pages(&text)?;
    debug!(pages = pages.len(), "Sending message in pages");

    let mut delivered = Vec::with_capacity(pages.len());
    for page in &pages {
        delivered.push(send(page.render()).await?);
    }
    Ok(TextDelivery::Paged(delivered))
}

fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use std::sync::{Arc, Mutex};

    const SHORT_LEN: usize = MAX_TEXT_LENGTH - HEADER_RESERVE;

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(!needs_paging(&"a".repeat(MAX_TEXT_LENGTH - 1)));
        assert!(needs_paging(&"a".repeat(MAX_TEXT_LENGTH)));
    }

    #[test]
    fn test_split_at_threshold_gives_two_pages() {
        let text = "x".repeat(MAX_TEXT_LENGTH);
        let pages = split_pages(&text).expect("within limit");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].body.len(), SHORT_LEN);
        assert_eq!(pages[1].body.len(), HEADER_RESERVE);
        assert_eq!(pages[1].render(), format!("[2/2] {}", "x".repeat(8)));
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        let text = "ж".repeat(SHORT_LEN + 1);
        let pages = split_pages(&text).expect("within limit");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].body.chars().count(), SHORT_LEN);
        assert_eq!(pages[1].body, "ж");
    }

    #[test]
    fn test_exactly_max_pages_is_allowed() {
        let text = "y".repeat(SHORT_LEN * MAX_PAGES);
        let pages = split_pages(&text).expect("99 pages fit");

        assert_eq!(pages.len(), MAX_PAGES);
        assert!(pages[98].render().starts_with("[99/99] "));
    }

    #[test]
    fn test_too_many_pages_carries_bodies() {
        let text = "z".repeat(SHORT_LEN * MAX_PAGES + 1);
        match split_pages(&text) {
            Err(CourierError::PagingLimitExceeded { pages }) => {
                assert_eq!(pages.len(), MAX_PAGES + 1);
                assert_eq!(pages.concat(), text);
            }
            other => panic!("expected paging limit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_short_text_is_sent_untouched() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();

        let delivery = send_paged("hello".to_string(), |text| {
            let log = log.clone();
            async move {
                log.lock().expect("lock").push(text);
                Ok::<_, TransportError>(1)
            }
        })
        .await
        .expect("send");

        assert_eq!(delivery, TextDelivery::Single(1));
        assert_eq!(*sent.lock().expect("lock"), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_page_stops_remaining_pages() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();
        let text = "p".repeat(SHORT_LEN * 3);

        let result = send_paged(text, |page| {
            let log = log.clone();
            async move {
                let mut log = log.lock().expect("lock");
                log.push(page);
                if log.len() == 2 {
                    Err(TransportError::message("Too Many Requests"))
                } else {
                    Ok(log.len())
                }
            }
        })
        .await;

        assert!(matches!(result, Err(CourierError::Transport(_))));
        assert_eq!(sent.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_text_makes_no_calls() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        let text = "q".repeat(SHORT_LEN * 100);

        let result = send_paged(text, |_| {
            let counter = counter.clone();
            async move {
                *counter.lock().expect("lock") += 1;
                Ok::<_, TransportError>(())
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(CourierError::PagingLimitExceeded { ref pages }) if pages.len() == 100
        ));
        assert_eq!(*calls.lock().expect("lock"), 0);
    }
}
