use thiserror::Error;

/// Failure reported by a data source while fetching a page.
///
/// This is the only way the explorer enters [`FetchState::Error`](crate::pager::FetchState).
/// Transport details stay with the source; the explorer keeps the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
