//! Configuration for API clients.

/// Everything needed to make authenticated requests against one base URL.
///
/// Build one per endpoint family (API, identity); fetch a token with
/// [`crate::request_access_token`] and store it in `oauth_access_token`.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Base URL path (e.g. `https://api.bitwarden.com`).
    pub base_path: String,
    /// HTTP client. Clients are cheap handles; clone freely.
    pub client: reqwest::Client,
    /// OAuth access token attached as a bearer header when present.
    pub oauth_access_token: Option<String>,
    /// User-Agent header value to send with requests.
    pub user_agent: Option<String>,
}

impl Configuration {
    /// Configuration for the given base URL with a default client and no
    /// token.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            client: reqwest::Client::new(),
            oauth_access_token: None,
            user_agent: Some(concat!("bwadmin/", env!("CARGO_PKG_VERSION")).to_owned()),
        }
    }

    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_path.trim_end_matches('/'), path);
        let mut builder = self.client.request(method, url);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.header(reqwest::header::USER_AGENT, user_agent);
        }
        if let Some(token) = &self.oauth_access_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}
