use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;
use time::Duration;
use url::Url;

use super::cookies;
use crate::traits::OAuthPersistence;
use crate::types::{AccessToken, CsrfToken, IdToken, Nonce};

const TOKEN_COOKIE_NAME: &str = "__oauth_token";
const ID_TOKEN_COOKIE_NAME: &str = "__oauth_id_token";

/// [`OAuthPersistence`] backed by encrypted (private) cookies.
///
/// The flow state lives in three short-lived HttpOnly cookies written at
/// login-redirect time (see the `assign_*` methods); the access token ends up
/// in a private cookie on the success response. `assign_token` expires the
/// flow cookies, so replaying the same callback fails CSRF validation.
///
/// All cookies are encrypted with the configured [`Key`] — the browser never
/// sees plaintext token material.
#[derive(Clone)]
pub struct CookiePersistence {
    key: Key,
    token_cookie_name: String,
    token_ttl: Duration,
    secure: bool,
}

impl CookiePersistence {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            token_cookie_name: TOKEN_COOKIE_NAME.to_string(),
            token_ttl: Duration::hours(1),
            secure: true,
        }
    }

    #[must_use]
    pub fn with_token_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.token_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Disable the `Secure` cookie attribute (local development only).
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Stash the CSRF token on an outgoing login redirect.
    ///
    /// The callback half of the flow only reads this state back; writing it is
    /// the login handler's job, and these helpers are what it uses.
    #[must_use]
    pub fn assign_csrf(&self, response: Response, csrf: &CsrfToken) -> Response {
        let jar = self
            .jar()
            .add(cookies::flow_cookie(cookies::CSRF_COOKIE_NAME, &csrf.0, self.secure));
        (jar, response).into_response()
    }

    /// Stash the OIDC nonce on an outgoing login redirect.
    #[must_use]
    pub fn assign_nonce(&self, response: Response, nonce: &Nonce) -> Response {
        let jar = self
            .jar()
            .add(cookies::flow_cookie(cookies::NONCE_COOKIE_NAME, &nonce.0, self.secure));
        (jar, response).into_response()
    }

    /// Stash the originally requested URI on an outgoing login redirect.
    #[must_use]
    pub fn assign_original_uri(&self, response: Response, uri: &Url) -> Response {
        let jar = self.jar().add(cookies::flow_cookie(
            cookies::ORIGINAL_URI_COOKIE_NAME,
            uri.as_str(),
            self.secure,
        ));
        (jar, response).into_response()
    }

    fn jar(&self) -> PrivateCookieJar {
        PrivateCookieJar::from_headers(&axum::http::HeaderMap::new(), self.key.clone())
    }

    fn request_jar(&self, request: &Parts) -> PrivateCookieJar {
        PrivateCookieJar::from_headers(&request.headers, self.key.clone())
    }

    fn cookie_value(&self, request: &Parts, name: &str) -> Option<String> {
        self.request_jar(request)
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }
}

impl OAuthPersistence for CookiePersistence {
    async fn retrieve_csrf(&self, request: &Parts) -> Option<CsrfToken> {
        self.cookie_value(request, cookies::CSRF_COOKIE_NAME)
            .map(CsrfToken)
    }

    async fn retrieve_nonce(&self, request: &Parts) -> Option<Nonce> {
        self.cookie_value(request, cookies::NONCE_COOKIE_NAME)
            .map(Nonce)
    }

    async fn retrieve_original_uri(&self, request: &Parts) -> Option<Url> {
        self.cookie_value(request, cookies::ORIGINAL_URI_COOKIE_NAME)?
            .parse()
            .ok()
    }

    async fn assign_token(
        &self,
        request: &Parts,
        response: Response,
        access_token: AccessToken,
        id_token: Option<IdToken>,
    ) -> Response {
        let mut jar = self.request_jar(request).add(cookies::token_cookie(
            &self.token_cookie_name,
            &access_token.0,
            self.token_ttl,
            self.secure,
        ));
        if let Some(id_token) = id_token {
            jar = jar.add(cookies::token_cookie(
                ID_TOKEN_COOKIE_NAME,
                &id_token.0,
                self.token_ttl,
                self.secure,
            ));
        }

        // Consume the flow state: a replayed callback must not validate again.
        jar = jar
            .remove(cookies::clear_cookie(cookies::CSRF_COOKIE_NAME))
            .remove(cookies::clear_cookie(cookies::NONCE_COOKIE_NAME))
            .remove(cookies::clear_cookie(cookies::ORIGINAL_URI_COOKIE_NAME));

        (jar, response).into_response()
    }

    fn auth_failure_response(&self) -> Response {
        (StatusCode::FORBIDDEN, "Authentication failed").into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{HeaderValue, Request};

    use super::*;

    fn persistence() -> CookiePersistence {
        CookiePersistence::new(Key::generate())
    }

    fn empty_response() -> Response {
        StatusCode::OK.into_response()
    }

    /// Collect the `name=value` pairs a response sets, attribute-stripped.
    fn set_cookie_pairs(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| {
                v.to_str()
                    .unwrap()
                    .split(';')
                    .next()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    /// Build request parts carrying the cookies a previous response set.
    fn parts_with_cookies(response: &Response) -> Parts {
        let cookie_header = set_cookie_pairs(response).join("; ");
        Request::builder()
            .uri("https://app.example.com/callback")
            .header(COOKIE, HeaderValue::from_str(&cookie_header).unwrap())
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn csrf_round_trips_through_private_cookie() {
        let persistence = persistence();
        let csrf = CsrfToken("S1".into());

        let response = persistence.assign_csrf(empty_response(), &csrf);
        let parts = parts_with_cookies(&response);

        assert_eq!(persistence.retrieve_csrf(&parts).await, Some(csrf));
        assert_eq!(persistence.retrieve_nonce(&parts).await, None);
    }

    #[tokio::test]
    async fn cookie_value_is_encrypted_on_the_wire() {
        let persistence = persistence();
        let response = persistence.assign_csrf(empty_response(), &CsrfToken("S1".into()));

        let raw = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(!raw.contains("S1"), "plaintext leaked: {raw}");
    }

    #[tokio::test]
    async fn wrong_key_cannot_read_cookies() {
        let writer = persistence();
        let reader = persistence();

        let response = writer.assign_csrf(empty_response(), &CsrfToken("S1".into()));
        let parts = parts_with_cookies(&response);

        assert_eq!(reader.retrieve_csrf(&parts).await, None);
    }

    #[tokio::test]
    async fn original_uri_round_trips() {
        let persistence = persistence();
        let uri: Url = "https://app.example.com/home".parse().unwrap();

        let response = persistence.assign_original_uri(empty_response(), &uri);
        let parts = parts_with_cookies(&response);

        assert_eq!(persistence.retrieve_original_uri(&parts).await, Some(uri));
    }

    #[tokio::test]
    async fn assign_token_sets_token_and_clears_flow_cookies() {
        let persistence = persistence();

        // A real browser replays all three flow cookies with the callback.
        let stash = persistence.assign_original_uri(
            persistence.assign_nonce(
                persistence.assign_csrf(empty_response(), &CsrfToken("S1".into())),
                &Nonce("N1".into()),
            ),
            &"https://app.example.com/home".parse().unwrap(),
        );
        let parts = parts_with_cookies(&stash);

        let response = persistence
            .assign_token(
                &parts,
                empty_response(),
                AccessToken("T1".into()),
                Some(IdToken("eyJ0".into())),
            )
            .await;

        let pairs = set_cookie_pairs(&response);
        assert!(pairs.iter().any(|c| c.starts_with("__oauth_token=")));
        assert!(pairs.iter().any(|c| c.starts_with("__oauth_id_token=")));
        // Flow cookies are expired, not rewritten.
        assert!(pairs.contains(&"__oauth_csrf=".to_string()));
        assert!(pairs.contains(&"__oauth_nonce=".to_string()));
        assert!(pairs.contains(&"__oauth_original_uri=".to_string()));
    }

    #[tokio::test]
    async fn failure_response_is_fixed_403() {
        let response = persistence().auth_failure_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
