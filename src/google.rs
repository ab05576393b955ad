//! Shared plumbing for the Google APIs the stores talk to.

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl};
use serde::Deserialize;

use crate::errors::RemoteError;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes the refresh token must have been granted.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Builds an OAuth client for Google's endpoints.
pub fn oauth_client(client_id: String, client_secret: String) -> Result<BasicClient, url::ParseError> {
    Ok(BasicClient::new(
        ClientId::new(client_id),
        Some(ClientSecret::new(client_secret)),
        AuthUrl::new(AUTH_URL.to_owned())?,
        Some(TokenUrl::new(TOKEN_URL.to_owned())?),
    )
    .set_auth_type(AuthType::RequestBody))
}

/// Mints access tokens from a long-lived refresh token.
pub struct GoogleAuth {
    client: BasicClient,
    refresh_token: RefreshToken,
}

impl GoogleAuth {
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
    ) -> Result<Self, url::ParseError> {
        Ok(GoogleAuth {
            client: oauth_client(client_id, client_secret)?,
            refresh_token: RefreshToken::new(refresh_token),
        })
    }

    /// Exchanges the refresh token for a fresh access token.
    pub async fn access_token(&self) -> Result<String, RemoteError> {
        let token = self
            .client
            .exchange_refresh_token(&self.refresh_token)
            .request_async(async_http_client)
            .await
            .map_err(|e| RemoteError::Authorization(e.to_string()))?;

        Ok(token.access_token().secret().clone())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Passes successful responses through and turns the rest into
/// [`RemoteError::Api`], keeping the message Google reports.
pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(RemoteError::Api {
        status: status.as_u16(),
        message: error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| status.to_string()),
    })
}

/// Extracts `error.message` from a Google error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}
