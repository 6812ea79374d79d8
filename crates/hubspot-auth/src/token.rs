//! Authorization code exchange
//!
//! One POST to the token endpoint with `grant_type=authorization_code`.
//! The response body is kept verbatim: it is staged in the store as the
//! credential blob and handed to the caller untouched.

use serde_json::Value;
use tracing::debug;

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Raw token endpoint response.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    raw: String,
}

impl TokenResponse {
    /// Validate that `raw` is a JSON object.
    pub fn parse(raw: String) -> Result<Self> {
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidTokenResponse(format!("not JSON: {e}")))?;
        if !json.is_object() {
            return Err(Error::InvalidTokenResponse(
                "expected a JSON object".to_owned(),
            ));
        }
        Ok(Self { raw })
    }

    /// Body exactly as the token endpoint returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Exchange an authorization code for tokens.
///
/// A non-success status is returned as `Error::TokenExchange` carrying the
/// response body, so the caller can surface HubSpot's own explanation.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&config.token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose().as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code", code),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading token response: {e}")))?;

    if !status.is_success() {
        debug!(%status, "token endpoint rejected code");
        return Err(Error::TokenExchange(body));
    }

    TokenResponse::parse(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Form;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use common::Secret;
    use std::collections::HashMap;

    const TOKEN_JSON: &str =
        r#"{"token_type":"bearer","refresh_token":"rt_1","access_token":"at_1","expires_in":1800}"#;

    /// Mock token endpoint: accepts `good-code` with the expected form fields.
    async fn start_token_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/oauth/v1/token", listener.local_addr().unwrap());

        let app = axum::Router::new().route(
            "/oauth/v1/token",
            axum::routing::post(|Form(form): Form<HashMap<String, String>>| async move {
                let valid = form.get("grant_type").map(String::as_str) == Some("authorization_code")
                    && form.get("client_id").map(String::as_str) == Some("client-id")
                    && form.get("client_secret").map(String::as_str) == Some("client-secret")
                    && form.get("redirect_uri").map(String::as_str) == Some("http://localhost/cb");
                match form.get("code").map(String::as_str) {
                    Some("good-code") if valid => (StatusCode::OK, TOKEN_JSON).into_response(),
                    Some("array-code") => (StatusCode::OK, "[1,2]").into_response(),
                    _ => (
                        StatusCode::BAD_REQUEST,
                        r#"{"status":"BAD_AUTH_CODE","message":"missing or unknown auth code"}"#,
                    )
                        .into_response(),
                }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        url
    }

    fn test_config(token_endpoint: &str) -> OAuthConfig {
        let mut config = OAuthConfig::new(
            "client-id",
            Secret::from("client-secret"),
            "http://localhost/cb",
        );
        config.token_endpoint = token_endpoint.to_owned();
        config
    }

    #[test]
    fn token_response_keeps_raw_body() {
        let token = TokenResponse::parse(TOKEN_JSON.to_owned()).unwrap();
        assert_eq!(token.raw(), TOKEN_JSON);
    }

    #[test]
    fn token_response_keeps_unusual_whitespace() {
        let raw = "{ \"access_token\" : \"at_1\" }\n";
        let token = TokenResponse::parse(raw.to_owned()).unwrap();
        assert_eq!(token.raw(), raw);
    }

    #[test]
    fn token_response_rejects_non_object() {
        assert!(matches!(
            TokenResponse::parse("not json".into()),
            Err(Error::InvalidTokenResponse(_))
        ));
        assert!(matches!(
            TokenResponse::parse("[]".into()),
            Err(Error::InvalidTokenResponse(_))
        ));
    }

    #[tokio::test]
    async fn exchange_sends_form_and_returns_body() {
        let url = start_token_server().await;
        let client = reqwest::Client::new();

        let token = exchange_code(&client, &test_config(&url), "good-code")
            .await
            .unwrap();
        assert_eq!(token.raw(), TOKEN_JSON);
    }

    #[tokio::test]
    async fn exchange_surfaces_provider_body_on_rejection() {
        let url = start_token_server().await;
        let client = reqwest::Client::new();

        let err = exchange_code(&client, &test_config(&url), "bad-code")
            .await
            .unwrap_err();
        match err {
            Error::TokenExchange(body) => assert_eq!(
                body,
                r#"{"status":"BAD_AUTH_CODE","message":"missing or unknown auth code"}"#
            ),
            other => panic!("expected TokenExchange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exchange_rejects_non_object_success_body() {
        let url = start_token_server().await;
        let client = reqwest::Client::new();

        let err = exchange_code(&client, &test_config(&url), "array-code")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTokenResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn exchange_reports_transport_failure_as_http_error() {
        let client = reqwest::Client::new();
        let config = test_config("http://127.0.0.1:1/token");
        let err = exchange_code(&client, &config, "good-code")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got {err:?}");
        assert!(!err.is_client_error());
    }
}
