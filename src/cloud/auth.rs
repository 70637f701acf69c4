//! Identity-provider login client
//!
//! Password-grant `InitiateAuth` against the regional Cognito endpoint.
//! No retries and no refresh-token exchange: a failed login is final for the caller.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::cloud::credentials::Credentials;
use crate::error::BridgeError;

const AMZ_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Which token from the authentication result is used as the bearer credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Id,
    Access,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
    #[serde(alias = "message")]
    message: Option<String>,
    #[serde(rename = "__type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    id_token: Option<String>,
    #[allow(dead_code)]
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Logs in with the held credentials and hands back a bearer token
pub struct AuthClient {
    endpoint: String,
    client_id: String,
    credentials: Credentials,
    token_kind: TokenKind,
    http_client: Client,
}

impl AuthClient {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        credentials: Credentials,
        token_kind: TokenKind,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            credentials,
            token_kind,
            http_client,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn login(&self) -> Result<String, BridgeError> {
        let body = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: AuthParameters {
                username: self.credentials.email(),
                password: self.credentials.password(),
            },
        };

        let payload = serde_json::to_vec(&body)
            .map_err(|e| BridgeError::Parse(format!("login request: {}", e)))?;

        let resp = self
            .http_client
            .post(&self.endpoint)
            .header("X-Amz-Target", AMZ_TARGET)
            .header("Content-Type", AMZ_JSON)
            .body(payload)
            .send()
            .await
            .map_err(|e| BridgeError::Authentication {
                kind: "RequestFailed".to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        // Error bodies are JSON too; fall back to the raw text when they are not.
        let parsed: Option<InitiateAuthResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let (kind, message) = match parsed {
                Some(r) => (
                    r.error_type.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                    r.message.unwrap_or(text),
                ),
                None => (format!("HTTP {}", status.as_u16()), text),
            };
            return Err(BridgeError::Authentication { kind, message });
        }

        let parsed = parsed.ok_or_else(|| {
            BridgeError::Parse(format!("login response is not valid JSON: {}", text))
        })?;

        let result = match parsed.authentication_result {
            Some(result) => result,
            None => {
                let kind = parsed
                    .challenge_name
                    .map(|c| format!("Challenge:{}", c))
                    .or(parsed.error_type)
                    .unwrap_or_else(|| "MissingAuthenticationResult".to_string());
                return Err(BridgeError::Authentication {
                    kind,
                    message: parsed
                        .message
                        .unwrap_or_else(|| "no authentication result in response".to_string()),
                });
            }
        };

        let token = match self.token_kind {
            TokenKind::Id => result.id_token,
            TokenKind::Access => result.access_token,
        };

        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            BridgeError::Authentication {
                kind: "MissingToken".to_string(),
                message: format!("authentication result has no {:?} token", self.token_kind),
            }
        })?;

        tracing::info!(
            "[Auth] Logged in as {}, token expires in {} sec",
            self.credentials.email(),
            result.expires_in.unwrap_or(0)
        );

        Ok(token)
    }
}
