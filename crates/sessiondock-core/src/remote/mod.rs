//! Contract with the remote session service.
//!
//! The remote service is the authority on which sessions exist. Everything
//! the client caches is checked against it before use.

mod http;

use thiserror::Error;

use crate::shuffle::ShuffleDictionary;

pub use http::{HttpConfig, HttpSessionService};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The server answered with a non-success status.
    #[error("unexpected server response to not match \"200\". Server says \"{body}\"")]
    Status { status: u16, body: String },

    /// The server answered 200 but with something other than what was expected.
    #[error("unexpected response from server. received {0}")]
    UnexpectedResponse(String),
}

/// Operations the client needs from the remote session service.
///
/// All calls suspend the caller until the service answers. Timeouts are the
/// implementation's concern.
#[allow(async_fn_in_trait)]
pub trait RemoteSessionService {
    /// Ask the service to issue a new session id.
    async fn create_session(&self) -> Result<String, RemoteError>;

    /// Whether the service still recognizes `id`.
    async fn session_exists(&self, id: &str) -> Result<bool, RemoteError>;

    /// Push session settings. An empty `httpproxy` means no proxy.
    async fn edit_session(
        &self,
        id: &str,
        httpproxy: &str,
        enable_shuffling: bool,
    ) -> Result<(), RemoteError>;

    /// Remove a session. Deleting an unknown id is not an error.
    async fn delete_session(&self, id: &str) -> Result<(), RemoteError>;

    /// Whether the service requires a password for session operations.
    async fn needs_password(&self) -> Result<bool, RemoteError>;

    /// The shuffle dictionary for `id`, or `None` when URLs pass through as-is.
    async fn shuffle_dictionary(&self, id: &str)
        -> Result<Option<ShuffleDictionary>, RemoteError>;
}
