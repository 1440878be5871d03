use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub(super) const CSRF_COOKIE_NAME: &str = "__oauth_csrf";
pub(super) const NONCE_COOKIE_NAME: &str = "__oauth_nonce";
pub(super) const ORIGINAL_URI_COOKIE_NAME: &str = "__oauth_original_uri";

// Flow cookies only need to survive the round trip to the authorization server.
const FLOW_COOKIE_TTL: Duration = Duration::minutes(10);

/// Create a short-lived flow-state cookie (CSRF token, nonce, original URI).
pub(super) fn flow_cookie(name: &'static str, value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(FLOW_COOKIE_TTL)
        .build()
}

/// Create the token cookie assigned on successful callback validation.
pub(super) fn token_cookie(
    name: &str,
    value: &str,
    ttl: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl)
        .build()
}

/// Create a removal cookie for a consumed flow cookie.
pub(super) fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
