use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Authorization code issued by the authorization server.
///
/// Short-lived, single-use credential echoed back in the callback and exchanged
/// server-side for tokens. Opaque: never inspected, only forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct AuthorizationCode(pub String);

/// CSRF token (the `state` parameter).
///
/// Minted at login-redirect time, echoed back by the authorization server, and
/// compared by exact byte equality against the persisted copy. This comparison
/// is what binds a callback to the request that started it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct CsrfToken(pub String);

/// OIDC nonce.
///
/// Bound like the CSRF token, but verified via a claim inside the ID token
/// rather than a request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct Nonce(pub String);

/// Access token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(pub String);

// Token material stays out of debug output.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Raw (unverified) OIDC ID token, as received on the wire.
///
/// Signature and issuer verification are the
/// [`IdTokenConsumer`](crate::IdTokenConsumer)'s job.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct IdToken(pub String);

impl std::fmt::Debug for IdToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IdToken(..)")
    }
}

/// Result of exchanging an authorization code at the token endpoint.
///
/// OIDC allows the ID token to arrive at the authorization endpoint, the token
/// endpoint, or both; `id_token` here covers the token-endpoint arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchangeResult {
    pub access_token: AccessToken,
    pub id_token: Option<IdToken>,
}
