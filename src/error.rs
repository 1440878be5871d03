/// Crate-level errors surfaced by configuration and the HTTP token client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Token endpoint answered with a non-success status.
    #[error("OAuth2 error during {operation}: status {status:?}: {detail}")]
    OAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Closed taxonomy of callback validation failures. All terminal.
///
/// Every variant collapses to the persistence layer's single fixed failure
/// response, so the response never reveals which check rejected the request.
/// The kind is only visible in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// No `code` parameter in the query string or URL fragment.
    #[error("authorization code missing from callback")]
    AuthorizationCodeMissing,
    /// `state` absent, persisted CSRF token absent, or the two differ.
    ///
    /// An expired session (nothing persisted) and a genuine mismatch are
    /// deliberately indistinguishable.
    #[error("invalid CSRF token")]
    InvalidCsrfToken,
    /// ID token present but its nonce claim differs from the persisted nonce.
    #[error("invalid nonce")]
    InvalidNonce,
    /// Token exchange returned nothing (includes network and timeout failure).
    #[error("could not fetch access token")]
    CouldNotFetchAccessToken,
}
