use frag_auth::BasicAuth;
use frag_core::Fragments;

/// Shared handler state. Cloning is cheap: every field is a handle.
#[derive(Clone)]
pub struct FragmentsState {
    pub fragments: Fragments,
    pub auth: BasicAuth,
    /// Base for `Location` headers; the request `Host` is used when unset
    pub api_url: Option<String>,
}

impl FragmentsState {
    pub fn new(fragments: Fragments, auth: BasicAuth) -> Self {
        Self {
            fragments,
            auth,
            api_url: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into().trim_end_matches('/').to_string());
        self
    }
}
