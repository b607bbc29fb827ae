use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::session::{Session, User};
use crate::models::settings::BackendSettings;
use super::rest::describe_error_body;

/// Client for the backend's identity service (`/auth/v1`).
///
/// Produces `Session` values; it never stores one. Callers keep the session
/// and hand it to whatever needs to write.
pub struct IdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Auto-confirmed account, already signed in
    SignedIn(Session),
    /// Account created; the user must confirm their email before signing in
    ConfirmationRequired(User),
}

// ── Identity API response types ─────────────────────────────────────

/// Token grant payload returned by password and refresh-token sign-ins.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until expiry
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp of expiry
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl TokenResponse {
    /// Turn the grant into a session, preferring the absolute expiry.
    #[must_use]
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| self.expires_in.map(|secs| now + ChronoDuration::seconds(secs)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Token(TokenResponse),
    User(User),
}

impl IdentityClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
            anon_key: settings.anon_key.clone(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn success_body(response: Response) -> Result<String, CoreError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(CoreError::Auth(format!(
                "HTTP {}: {}",
                status.as_u16(),
                describe_error_body(&body)
            )))
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, CoreError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = Self::success_body(response).await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        tracing::info!(user_id = %token.user.id, "signed in");
        Ok(token.into_session(Utc::now()))
    }

    /// Create an account. Depending on the project's settings the account is
    /// either signed in right away or waits for email confirmation.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, CoreError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = Self::success_body(response).await?;
        match serde_json::from_str::<SignUpResponse>(&body)? {
            SignUpResponse::Token(token) => Ok(SignUpOutcome::SignedIn(token.into_session(Utc::now()))),
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired(user)),
        }
    }

    /// Exchange the session's refresh token for a fresh session.
    pub async fn refresh(&self, session: &Session) -> Result<Session, CoreError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| CoreError::Auth("session has no refresh token".into()))?;
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let body = Self::success_body(response).await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(token.into_session(Utc::now()))
    }

    /// Revoke the session server-side. The caller drops its copy afterwards.
    pub async fn sign_out(&self, session: &Session) -> Result<(), CoreError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Self::success_body(response).await?;
        tracing::info!(user_id = %session.user.id, "signed out");
        Ok(())
    }
}
