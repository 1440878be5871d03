#![doc = include_str!("../README.md")]

pub mod callback;
pub mod error;
pub mod id_token;
pub mod middleware;
pub mod oauth;
pub mod params;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use callback::OAuthCallback;
pub use error::{CallbackError, Error};
pub use id_token::{NoOpIdTokenConsumer, nonce_claim};
pub use oauth::{HttpAccessTokenFetcher, OAuthConfig, TokenResponse};
pub use params::CallbackParameters;
pub use traits::{AccessTokenFetcher, IdTokenConsumer, OAuthPersistence};
pub use types::{
    AccessToken, AuthorizationCode, CsrfToken, IdToken, Nonce, TokenExchangeResult,
};
