use std::future::Future;

use axum::http::request::Parts;
use axum::response::Response;
use url::Url;

use crate::types::{AccessToken, AuthorizationCode, CsrfToken, IdToken, Nonce, TokenExchangeResult};

/// Consumer-provided persistence for the OAuth flow state.
///
/// The flow state (CSRF token, nonce, original target URI) is written when the
/// login redirect is issued and read back here, keyed by whatever the
/// implementation uses to correlate the session (typically a cookie). The
/// concrete representation — encrypted cookies, a server-side session store, a
/// signed JWT — is entirely the implementation's choice.
///
/// A private-cookie implementation is provided:
/// [`CookiePersistence`](crate::middleware::CookiePersistence).
pub trait OAuthPersistence: Send + Sync + 'static {
    /// CSRF token persisted when the flow started, if any.
    fn retrieve_csrf(&self, request: &Parts) -> impl Future<Output = Option<CsrfToken>> + Send;

    /// Nonce persisted when the flow started, if any.
    fn retrieve_nonce(&self, request: &Parts) -> impl Future<Output = Option<Nonce>> + Send;

    /// URI the user originally asked for, to redirect back to on success.
    fn retrieve_original_uri(&self, request: &Parts) -> impl Future<Output = Option<Url>> + Send;

    /// Attach the token material to the outgoing success response.
    ///
    /// This is the step that consumes the flow state: implementations must
    /// clear the persisted CSRF token and nonce here, so replaying the same
    /// callback fails validation the second time.
    fn assign_token(
        &self,
        request: &Parts,
        response: Response,
        access_token: AccessToken,
        id_token: Option<IdToken>,
    ) -> impl Future<Output = Response> + Send;

    /// The single fixed response returned for every validation failure.
    ///
    /// Deliberately uniform across failure kinds, so callers probing the
    /// endpoint cannot tell which check rejected them.
    fn auth_failure_response(&self) -> Response;
}

/// Consumer-provided handling of OIDC ID tokens.
///
/// OIDC allows an ID token to arrive at the authorization endpoint, the token
/// endpoint, or both; the two `consume_*` hooks correspond to those arrival
/// points and are invoked exactly where each token surfaces. Signature and
/// issuer verification belong here, not in the callback pipeline.
///
/// Plain-OAuth2 deployments can use [`NoOpIdTokenConsumer`](crate::NoOpIdTokenConsumer).
pub trait IdTokenConsumer: Send + Sync + 'static {
    /// Extract the `nonce` claim from an ID token.
    ///
    /// Malformed tokens must yield `None`, never panic or error: the pipeline
    /// turns a missing or mismatched nonce into a uniform failure.
    fn nonce_from_id_token(&self, id_token: &IdToken) -> Option<Nonce>;

    /// Consume an ID token delivered with the authorization response.
    fn consume_from_authorization_response(
        &self,
        id_token: &IdToken,
    ) -> impl Future<Output = ()> + Send;

    /// Consume an ID token delivered with the access-token response.
    fn consume_from_access_token_response(
        &self,
        id_token: &IdToken,
    ) -> impl Future<Output = ()> + Send;
}

/// Consumer-provided authorization-code exchange.
///
/// `None` means the exchange did not produce tokens, for whatever reason —
/// implementations must normalize transport errors, timeouts, and non-success
/// responses to `None` rather than propagating them. The pipeline maps `None`
/// to its uniform failure response.
///
/// An HTTP implementation is provided:
/// [`HttpAccessTokenFetcher`](crate::HttpAccessTokenFetcher).
pub trait AccessTokenFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        code: &AuthorizationCode,
    ) -> impl Future<Output = Option<TokenExchangeResult>> + Send;
}
