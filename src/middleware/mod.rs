//! Plug-and-play axum integration for the callback validator.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oauth2_callback::middleware::{callback_routes, CallbackAuthConfig};
//! use oauth2_callback::{HttpAccessTokenFetcher, NoOpIdTokenConsumer};
//!
//! // 1. Configure from environment
//! let config = CallbackAuthConfig::from_env()?;
//!
//! // 2. Build the provided collaborators (any of them can be your own impl)
//! let persistence = config.cookie_persistence();
//! let fetcher = HttpAccessTokenFetcher::new(config.oauth().clone());
//!
//! // 3. Mount the callback route
//! let app = axum::Router::new()
//!     .merge(callback_routes(config, persistence, NoOpIdTokenConsumer, fetcher));
//! ```
//!
//! The login-redirect half of the flow is out of scope; whatever issues it
//! should stash the CSRF token, nonce, and original URI through the same
//! persistence — [`CookiePersistence::assign_csrf`] and friends exist for that.

mod config;
mod cookies;
mod persistence;
mod routes;

pub use config::CallbackAuthConfig;
pub use persistence::CookiePersistence;
pub use routes::callback_routes;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
