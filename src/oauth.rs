use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::traits::AccessTokenFetcher;
use crate::types::{AccessToken, AuthorizationCode, IdToken, TokenExchangeResult};

const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// OAuth2 client configuration for the token exchange.
///
/// Required fields are constructor parameters — no runtime "missing field" errors.
///
/// ```rust,ignore
/// use oauth2_callback::OAuthConfig;
///
/// let config = OAuthConfig::new(
///     "my-client-id",
///     "https://issuer.example.com/oauth/token".parse()?,
///     "https://my-app.com/callback".parse()?,
/// )
/// .with_client_secret("s3cret");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: Option<String>,
    pub(crate) token_url: Url,
    pub(crate) redirect_uri: Url,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(client_id: impl Into<String>, token_url: Url, redirect_uri: Url) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            token_url,
            redirect_uri,
        }
    }

    /// Set the client secret (confidential clients).
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Token exchange endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// OAuth2 redirect URI (echoed in the exchange, per RFC 6749 §4.1.3).
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }
}

/// Token response from the token endpoint (RFC 6749 §5.1 + OIDC Core §3.1.3.3).
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl From<TokenResponse> for TokenExchangeResult {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: AccessToken(response.access_token),
            id_token: response.id_token.map(IdToken),
        }
    }
}

/// [`AccessTokenFetcher`] performing the `authorization_code` grant over HTTP.
pub struct HttpAccessTokenFetcher {
    config: OAuthConfig,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpAccessTokenFetcher {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Bound the token-exchange call (default 10s). A timed-out exchange is
    /// indistinguishable from a failed one.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or timeout, or
    /// [`Error::OAuth`] if the token endpoint answers with a non-success status.
    pub async fn exchange_code(&self, code: &AuthorizationCode) -> Result<TokenResponse, Error> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code.0.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::OAuth {
            operation,
            status: Some(status),
            detail: body,
        })
    }
}

impl AccessTokenFetcher for HttpAccessTokenFetcher {
    // Boundary normalization: the pipeline only distinguishes "got tokens"
    // from "did not"; the cause goes to the log.
    async fn fetch(&self, code: &AuthorizationCode) -> Option<TokenExchangeResult> {
        match self.exchange_code(code).await {
            Ok(response) => Some(response.into()),
            Err(e) => {
                tracing::error!(error = %e, "Token exchange failed");
                None
            }
        }
    }
}
