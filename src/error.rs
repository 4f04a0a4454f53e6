//! Error types and result alias for the viewer core.

/// The result type used throughout the viewer core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by viewer operations.
///
/// Metrics unavailability is deliberately *not* represented here: the
/// metrics cache degrades to a fallback record instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A postal code not present in the state table. Fatal to the
    /// requested operation; never retried automatically.
    #[error("unknown state/territory postal code: {code}")]
    UnknownState {
        /// The code as the caller supplied it.
        code: String,
    },

    /// A topology payload could not be fetched (transport failure or a
    /// non-success response).
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// A fetched payload contained no usable geometry.
    #[error("bad topology payload: {message}")]
    Format {
        /// Description of what was wrong with the document.
        message: String,
    },
}

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }
}
