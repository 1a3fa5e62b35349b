//! Error types surfaced by the courier layer.

use std::fmt;
use thiserror::Error;

use crate::pager::MAX_PAGES;

/// Boxed error type used for opaque collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Opaque failure reported by the underlying bot transport.
#[derive(Debug)]
pub struct TransportError(BoxError);

impl TransportError {
    /// Wrap any transport-level error.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }

    /// Build a transport error from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(message.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Errors reported by a [`crate::resolver::ChatResolver`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The resolver answered, but knows no chat with that name
    #[error("no chat found for '{0}'")]
    NotFound(String),
    /// The resolver backend failed
    #[error("resolver backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Step of the kick-without-ban operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStep {
    /// Removing (banning) the participant
    Ban,
    /// Lifting the ban right after removal
    Unban,
}

impl fmt::Display for ModerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ban => f.write_str("ban"),
            Self::Unban => f.write_str("unban"),
        }
    }
}

/// Errors returned by every courier operation.
#[derive(Debug, Error)]
pub enum CourierError {
    /// A symbolic chat identifier could not be resolved
    #[error("failed to resolve chat '{username}': {source}")]
    Resolution {
        /// The `@name` that was being resolved
        username: String,
        /// Error reported by the resolver
        #[source]
        source: ResolveError,
    },
    /// Paging a text would need more pages than the header format allows
    #[error("paging produced {} pages, more than the {max} allowed", .pages.len(), max = MAX_PAGES)]
    PagingLimitExceeded {
        /// Page bodies computed before the send was aborted
        pages: Vec<String>,
    },
    /// The underlying transport call failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// One step of the kick-without-ban operation failed
    #[error("{step} step of kick without ban failed: {source}")]
    CompositeStep {
        /// Which step failed
        step: ModerationStep,
        /// Error reported by the transport for that step
        #[source]
        source: TransportError,
    },
    /// The operation was dropped before producing an outcome
    #[error("operation was dropped before it settled")]
    Cancelled,
}

/// Result alias for courier operations.
pub type Result<T, E = CourierError> = std::result::Result<T, E>;
