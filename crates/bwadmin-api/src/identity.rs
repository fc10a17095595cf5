//! Client-credentials authentication against the identity endpoint.

use serde::Deserialize;

use crate::{error::read_json, ApiError, Configuration};

/// Successful response from `/connect/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for Public API requests.
    pub access_token: String,
    /// Seconds until the token expires.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Always `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Request an organization access token with client credentials.
///
/// `config` must point at the identity endpoint (cloud:
/// `https://identity.bitwarden.com`). The token is scoped
/// `api.organization`; user-scoped client ids are rejected by the server.
pub async fn request_access_token(
    config: &Configuration,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse, ApiError> {
    let response = config
        .request(reqwest::Method::POST, "/connect/token")
        .form(&[
            ("grant_type", "client_credentials"),
            ("scope", "api.organization"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await?;

    read_json(response).await
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn posts_client_credentials_as_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=api.organization"))
            .and(body_string_contains("client_id=organization.1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let token = request_access_token(&config, "organization.1234", "secret")
            .await
            .expect("token");

        assert_eq!(token.access_token, "tok-1");
        assert_eq!(token.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn error_response_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let err = request_access_token(&config, "bad", "creds")
            .await
            .expect_err("must fail");

        match err {
            ApiError::Response { status, content } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(content, "invalid_client");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
