//! Fetch error types.

use thiserror::Error;

use crate::domain::ports::{TransportError, TransportErrorKind};

/// Failure of a catalog page or image fetch.
///
/// Cloneable so one outcome can be handed to every caller waiting on the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("transport error: {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    #[error("server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Creates transport error of no particular kind.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            kind: TransportErrorKind::Other,
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns whether error is transport related.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns the transport failure category, if this is a transport error.
    #[must_use]
    pub const fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns whether retrying the same request may succeed.
    ///
    /// Malformed bodies and client errors will not fix themselves; connectivity
    /// problems, throttling and server errors might.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus(code) => *code == 408 || *code == 429 || *code >= 500,
            Self::Decode { .. } => false,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        Self::Transport {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
