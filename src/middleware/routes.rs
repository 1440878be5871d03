use axum::Router;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::get;

use super::config::CallbackAuthConfig;
use crate::callback::OAuthCallback;
use crate::traits::{AccessTokenFetcher, IdTokenConsumer, OAuthPersistence};

/// Create a router serving `GET {auth_path}/callback`.
///
/// The route is the crate's pipeline behind an axum surface: every request is
/// answered with either a `307` redirect carrying assigned token material or
/// the persistence layer's fixed failure response.
pub fn callback_routes<P, C, F>(
    config: CallbackAuthConfig,
    persistence: P,
    id_token_consumer: C,
    access_token_fetcher: F,
) -> Router
where
    P: OAuthPersistence,
    C: IdTokenConsumer,
    F: AccessTokenFetcher,
{
    let handler = OAuthCallback::new(persistence, id_token_consumer, access_token_fetcher);

    Router::new()
        .route(
            &format!("{}/callback", config.auth_path()),
            get(callback::<P, C, F>),
        )
        .with_state(handler)
}

async fn callback<P, C, F>(
    State(handler): State<OAuthCallback<P, C, F>>,
    request: Request,
) -> Response
where
    P: OAuthPersistence,
    C: IdTokenConsumer,
    F: AccessTokenFetcher,
{
    let (parts, _body) = request.into_parts();
    handler.handle(&parts).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::id_token::NoOpIdTokenConsumer;
    use crate::middleware::persistence::CookiePersistence;
    use crate::oauth::OAuthConfig;
    use crate::types::{
        AccessToken, AuthorizationCode, CsrfToken, IdToken, TokenExchangeResult,
    };
    use axum_extra::extract::cookie::Key;

    struct StubFetcher {
        result: Option<TokenExchangeResult>,
        calls: AtomicUsize,
    }

    impl AccessTokenFetcher for Arc<StubFetcher> {
        async fn fetch(&self, _code: &AuthorizationCode) -> Option<TokenExchangeResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn config() -> CallbackAuthConfig {
        let oauth = OAuthConfig::new(
            "test-client",
            "https://issuer.example.com/oauth/token".parse().unwrap(),
            "https://app.example.com/callback".parse().unwrap(),
        );
        CallbackAuthConfig::new(oauth)
            .with_cookie_key(Key::generate())
            .with_secure_cookies(false)
    }

    fn app_with(
        persistence: CookiePersistence,
        fetcher: Arc<StubFetcher>,
    ) -> Router {
        callback_routes(config(), persistence, NoOpIdTokenConsumer, fetcher)
    }

    /// Cookie header carrying the flow cookies a stash response set.
    fn flow_cookie_header(stash: &axum::response::Response) -> String {
        stash
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn callback_request(query: &str, cookie_header: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/oauth/callback?{query}"))
            .header(COOKIE, cookie_header)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_success_redirects_and_assigns_token() {
        let persistence = CookiePersistence::new(Key::generate()).with_secure_cookies(false);
        let fetcher = Arc::new(StubFetcher {
            result: Some(TokenExchangeResult {
                access_token: AccessToken("T1".into()),
                id_token: None,
            }),
            calls: AtomicUsize::new(0),
        });
        let app = callback_routes(
            config(),
            persistence.clone(),
            NoOpIdTokenConsumer,
            fetcher.clone(),
        );

        let stash = persistence.assign_original_uri(
            persistence.assign_csrf(StatusCode::OK.into_response(), &CsrfToken("S1".into())),
            &"https://app.example.com/home".parse::<Url>().unwrap(),
        );
        let request = callback_request("code=abc&state=S1", &flow_cookie_header(&stash));

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://app.example.com/home"
        );
        let set_cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(set_cookies.iter().any(|c| c.starts_with("__oauth_token=")));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tampered_state_is_rejected_uniformly() {
        let persistence = CookiePersistence::new(Key::generate()).with_secure_cookies(false);
        let fetcher = Arc::new(StubFetcher {
            result: Some(TokenExchangeResult {
                access_token: AccessToken("T1".into()),
                id_token: Some(IdToken("eyJ0".into())),
            }),
            calls: AtomicUsize::new(0),
        });
        let app = app_with(persistence.clone(), fetcher.clone());

        let stash = persistence.assign_csrf(StatusCode::OK.into_response(), &CsrfToken("S1".into()));
        let request = callback_request("code=abc&state=S2", &flow_cookie_header(&stash));

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn request_without_flow_cookies_is_rejected() {
        let persistence = CookiePersistence::new(Key::generate()).with_secure_cookies(false);
        let fetcher = Arc::new(StubFetcher {
            result: None,
            calls: AtomicUsize::new(0),
        });
        let app = app_with(persistence, fetcher.clone());

        let request = Request::builder()
            .uri("/oauth/callback?code=abc&state=S1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn custom_auth_path_mounts_callback_there() {
        let persistence = CookiePersistence::new(Key::generate()).with_secure_cookies(false);
        let fetcher = Arc::new(StubFetcher {
            result: None,
            calls: AtomicUsize::new(0),
        });
        let oauth = OAuthConfig::new(
            "test-client",
            "https://issuer.example.com/oauth/token".parse().unwrap(),
            "https://app.example.com/callback".parse().unwrap(),
        );
        let app = callback_routes(
            CallbackAuthConfig::new(oauth).with_auth_path("/api/auth"),
            persistence,
            NoOpIdTokenConsumer,
            fetcher,
        );

        let request = Request::builder()
            .uri("/api/auth/callback")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        // Reaches the handler (uniform failure), not the router's 404.
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
