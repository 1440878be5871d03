use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::traits::IdTokenConsumer;
use crate::types::{IdToken, Nonce};

/// Extract the `nonce` claim from a JWT-shaped ID token without verifying it.
///
/// Decodes the payload segment as base64url JSON and looks up `nonce`. Any
/// malformed input yields `None`. Signature verification is deliberately not
/// done here — the nonce comparison itself carries no trust, it only binds the
/// token to the session that started the flow; verification is the
/// [`IdTokenConsumer`]'s job.
#[must_use]
pub fn nonce_claim(id_token: &IdToken) -> Option<Nonce> {
    let payload = id_token.0.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    claims
        .get("nonce")?
        .as_str()
        .map(|nonce| Nonce(nonce.to_string()))
}

/// [`IdTokenConsumer`] for plain-OAuth2 deployments that never see ID tokens.
///
/// Yields no nonce and ignores consumption, so an unexpected ID token in the
/// callback fails nonce validation whenever a nonce was persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpIdTokenConsumer;

impl IdTokenConsumer for NoOpIdTokenConsumer {
    fn nonce_from_id_token(&self, _id_token: &IdToken) -> Option<Nonce> {
        None
    }

    async fn consume_from_authorization_response(&self, _id_token: &IdToken) {}

    async fn consume_from_access_token_response(&self, _id_token: &IdToken) {}
}
