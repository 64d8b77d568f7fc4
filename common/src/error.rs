//! Error taxonomy shared by the client and the editor.
//!
//! Every failure the admin can hit ends up as a `CmsError` and is rendered at
//! the UI boundary as a toast or inline status. Partial success of a combined
//! save-and-publish is not an error; see `client::SavePublishOutcome`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CmsError {
    /// No backend endpoint configured. Raised before any network call.
    #[error("The content backend is not configured")]
    Config,

    /// No session token is available for an authenticated call.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The backend rejected the session token.
    #[error("Session rejected: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("The server answered with HTTP {status}")]
    Http { status: u16 },

    /// The backend answered `{ok: false, message}`.
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Client-side validation, blocked before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CmsError {
    /// Whether the user should be told to log in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, CmsError::NotLoggedIn | CmsError::Unauthorized(_))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CmsError::Validation(message.into())
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CmsError>;
