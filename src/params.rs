use url::Url;

use crate::error::CallbackError;
use crate::types::{AuthorizationCode, CsrfToken, IdToken};

/// Parameters extracted once from the inbound callback URL.
///
/// `code` is required; `state` and `id_token` are optional at extraction time
/// and validated by the pipeline. Immutable after construction.
#[derive(Debug, Clone)]
pub struct CallbackParameters {
    pub code: AuthorizationCode,
    pub state: Option<CsrfToken>,
    pub id_token: Option<IdToken>,
}

impl CallbackParameters {
    /// Extract callback parameters from the request URL.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::AuthorizationCodeMissing`] if `code` is absent
    /// from both the query string and the fragment.
    pub fn from_url(url: &Url) -> Result<Self, CallbackError> {
        let code = query_or_fragment(url, "code")
            .map(AuthorizationCode)
            .ok_or(CallbackError::AuthorizationCodeMissing)?;

        Ok(Self {
            code,
            state: query_or_fragment(url, "state").map(CsrfToken),
            id_token: query_or_fragment(url, "id_token").map(IdToken),
        })
    }
}

/// Look up a callback parameter, query string first, URL fragment second.
///
/// Implicit/hybrid-flow callbacks deliver their parameters in the fragment
/// (form-urlencoded, like a query string), so each key falls back there when
/// the query string lacks it. The query value always wins when both carry the
/// same key.
pub(crate) fn query_or_fragment(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.fragment().and_then(|fragment| {
                url::form_urlencoded::parse(fragment.as_bytes())
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.into_owned())
            })
        })
}
