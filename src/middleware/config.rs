use axum_extra::extract::cookie::Key;
use url::Url;

use super::persistence::CookiePersistence;
use crate::error::Error;
use crate::oauth::OAuthConfig;

/// Configuration for the callback route and its cookie persistence.
///
/// Required fields are constructor parameters — no runtime "missing field"
/// errors. Use [`from_env()`](CallbackAuthConfig::from_env) for
/// convention-based setup, or [`new()`](CallbackAuthConfig::new) with `with_*`
/// methods for full control.
pub struct CallbackAuthConfig {
    oauth: OAuthConfig,
    cookie_key: Key,
    auth_path: String,
    secure_cookies: bool,
}

impl CallbackAuthConfig {
    /// Create config with the required OAuth2 client settings.
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(oauth: OAuthConfig) -> Self {
        Self {
            oauth,
            cookie_key: Key::generate(),
            auth_path: "/oauth".into(),
            secure_cookies: true,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OAUTH_CLIENT_ID`: OAuth2 client ID
    /// - `OAUTH_TOKEN_URL`: token endpoint (must be a valid URL)
    /// - `OAUTH_REDIRECT_URI`: callback URI registered with the authorization server
    ///
    /// # Optional env vars
    /// - `OAUTH_CLIENT_SECRET`: client secret (confidential clients)
    /// - `COOKIE_KEY`: cookie encryption key bytes (at least 64); ephemeral key
    ///   when unset
    /// - `DEV_AUTH`: set to `"1"` or `"true"` to disable the `Secure` cookie
    ///   attribute for local development
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or URLs are
    /// invalid.
    pub fn from_env() -> Result<Self, Error> {
        let client_id = std::env::var("OAUTH_CLIENT_ID")
            .map_err(|_| Error::Config("OAUTH_CLIENT_ID is required".into()))?;
        let token_url: Url = std::env::var("OAUTH_TOKEN_URL")
            .map_err(|_| Error::Config("OAUTH_TOKEN_URL is required".into()))?
            .parse()
            .map_err(|e| Error::Config(format!("OAUTH_TOKEN_URL: {e}")))?;
        let redirect_uri: Url = std::env::var("OAUTH_REDIRECT_URI")
            .map_err(|_| Error::Config("OAUTH_REDIRECT_URI is required".into()))?
            .parse()
            .map_err(|e| Error::Config(format!("OAUTH_REDIRECT_URI: {e}")))?;

        let mut oauth = OAuthConfig::new(client_id, token_url, redirect_uri);
        if let Ok(secret) = std::env::var("OAUTH_CLIENT_SECRET") {
            oauth = oauth.with_client_secret(secret);
        }

        let dev_auth = matches!(std::env::var("DEV_AUTH").as_deref(), Ok("1") | Ok("true"));

        let cookie_key = match std::env::var("COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => Key::generate(),
        };

        Ok(Self::new(oauth)
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_auth))
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.cookie_key = key;
        self
    }

    /// Path prefix for the auth routes (default `/oauth`); the callback is
    /// mounted at `{auth_path}/callback`.
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// OAuth2 client settings, for building an
    /// [`HttpAccessTokenFetcher`](crate::HttpAccessTokenFetcher).
    #[must_use]
    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }

    #[must_use]
    pub(super) fn auth_path(&self) -> &str {
        &self.auth_path
    }

    /// Build the cookie-backed persistence matching this config.
    #[must_use]
    pub fn cookie_persistence(&self) -> CookiePersistence {
        CookiePersistence::new(self.cookie_key.clone())
            .with_secure_cookies(self.secure_cookies)
    }
}
