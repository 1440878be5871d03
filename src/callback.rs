use std::sync::Arc;

use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use url::Url;

use crate::error::CallbackError;
use crate::params::{CallbackParameters, query_or_fragment};
use crate::traits::{AccessTokenFetcher, IdTokenConsumer, OAuthPersistence};
use crate::types::CsrfToken;

/// The authorization-code callback validator.
///
/// Invoked once per inbound callback. Runs a fixed fail-fast pipeline — extract
/// parameters, check CSRF, check nonce, consume the authorization-response ID
/// token, exchange the code, consume the token-response ID token, redirect —
/// and collapses every failure to the persistence layer's single fixed failure
/// response. [`handle`](Self::handle) is total: it never errors and never
/// reveals which step rejected the request.
///
/// Stateless; collaborators are `Arc`-shared, so one instance serves unbounded
/// concurrent callbacks.
pub struct OAuthCallback<P, C, F> {
    persistence: Arc<P>,
    id_token_consumer: Arc<C>,
    access_token_fetcher: Arc<F>,
}

// Manual Clone: avoid derive adding `P: Clone, C: Clone, F: Clone` bounds.
impl<P, C, F> Clone for OAuthCallback<P, C, F> {
    fn clone(&self) -> Self {
        Self {
            persistence: self.persistence.clone(),
            id_token_consumer: self.id_token_consumer.clone(),
            access_token_fetcher: self.access_token_fetcher.clone(),
        }
    }
}

impl<P, C, F> OAuthCallback<P, C, F>
where
    P: OAuthPersistence,
    C: IdTokenConsumer,
    F: AccessTokenFetcher,
{
    #[must_use]
    pub fn new(persistence: P, id_token_consumer: C, access_token_fetcher: F) -> Self {
        Self {
            persistence: Arc::new(persistence),
            id_token_consumer: Arc::new(id_token_consumer),
            access_token_fetcher: Arc::new(access_token_fetcher),
        }
    }

    /// Handle a callback request.
    ///
    /// The callback URL is rebuilt from the request target, so parameters are
    /// read from the query string only. Fragment-delivered callbacks (hybrid
    /// flow) never reach a server this way; use [`handle_url`](Self::handle_url)
    /// when the full URL including fragment is known.
    pub async fn handle(&self, parts: &Parts) -> Response {
        let url = request_url(parts);
        self.handle_url(parts, &url).await
    }

    /// Handle a callback whose full URL (query and fragment) is already known.
    pub async fn handle_url(&self, parts: &Parts, url: &Url) -> Response {
        match self.run(parts, url).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "OAuth callback rejected");
                self.persistence.auth_failure_response()
            }
        }
    }

    async fn run(&self, parts: &Parts, url: &Url) -> Result<Response, CallbackError> {
        let parameters = CallbackParameters::from_url(url)?;
        self.validate_csrf(parts, url).await?;
        self.validate_nonce(parts, &parameters).await?;

        // The authorization-response ID token is consumed before the exchange;
        // the nonce check above is what established trust in it.
        if let Some(id_token) = &parameters.id_token {
            self.id_token_consumer
                .consume_from_authorization_response(id_token)
                .await;
        }

        let tokens = self
            .access_token_fetcher
            .fetch(&parameters.code)
            .await
            .ok_or(CallbackError::CouldNotFetchAccessToken)?;

        // An ID token may also arrive with the token response; each arrival
        // point gets its own consumption.
        if let Some(id_token) = &tokens.id_token {
            self.id_token_consumer
                .consume_from_access_token_response(id_token)
                .await;
        }

        let redirect = self.redirection_response(parts).await;
        tracing::info!("OAuth callback validated");
        Ok(self
            .persistence
            .assign_token(parts, redirect, tokens.access_token, tokens.id_token)
            .await)
    }

    async fn validate_csrf(&self, parts: &Parts, url: &Url) -> Result<(), CallbackError> {
        // `state` is re-read from the same query-or-fragment lookup that
        // produced the parameters: exactly the request's bytes get compared.
        let presented = query_or_fragment(url, "state").map(CsrfToken);
        let persisted = self.persistence.retrieve_csrf(parts).await;
        match (presented, persisted) {
            (Some(presented), Some(persisted)) if presented == persisted => Ok(()),
            _ => Err(CallbackError::InvalidCsrfToken),
        }
    }

    async fn validate_nonce(
        &self,
        parts: &Parts,
        parameters: &CallbackParameters,
    ) -> Result<(), CallbackError> {
        // OIDC is optional: no ID token, nothing to check.
        let Some(id_token) = &parameters.id_token else {
            return Ok(());
        };
        let claimed = self.id_token_consumer.nonce_from_id_token(id_token);
        let persisted = self.persistence.retrieve_nonce(parts).await;
        if claimed == persisted {
            Ok(())
        } else {
            Err(CallbackError::InvalidNonce)
        }
    }

    async fn redirection_response(&self, parts: &Parts) -> Response {
        let location = self
            .persistence
            .retrieve_original_uri(parts)
            .await
            .map(|uri| uri.to_string())
            .unwrap_or_else(|| "/".to_string());
        Redirect::temporary(&location).into_response()
    }
}

/// Rebuild the request URL from the request target. The scheme/host are
/// placeholders: parameter extraction only looks at query and fragment.
fn request_url(parts: &Parts) -> Url {
    let base = Url::parse("http://callback.invalid/").expect("valid base URL");
    let target = parts
        .uri
        .path_and_query()
        .map_or("/", |target| target.as_str());
    base.join(target).unwrap_or(base)
}
