//! Errors raised while polling the traffic feed.
//!
//! None of these are fatal: a failed cycle leaves the display stale and the
//! next tick tries again.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Transport failure, timeout, or a poll that could not be started
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The source answered with a non-2xx status
    #[error("source returned HTTP {0}")]
    Status(u16),

    /// The body was not a valid traffic document
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FeedError {
    /// Short label used in the status line and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Fetch(_) | FeedError::Status(_) => "fetch",
            FeedError::Decode(_) => "decode",
        }
    }
}

impl From<ureq::Error> for FeedError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => FeedError::Status(code),
            ureq::Error::Transport(t) => FeedError::Fetch(t.to_string()),
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Decode(err.to_string())
    }
}
