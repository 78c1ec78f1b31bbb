//! Supabase REST implementation of [`IdentityProvider`].
//!
//! Auth calls go to GoTrue under `/auth/v1`, profile reads and writes to
//! PostgREST under `/rest/v1/profiles`.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use trafficeye_core::profile::{Profile, ProfileUpdate};
use trafficeye_core::session::AuthUser;

use crate::config::SupabaseConfig;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, SignUpOutcome};
use crate::session::AuthSession;

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailRow {
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for AuthUser {
    fn from(user: UserResponse) -> Self {
        AuthUser {
            id: user.id,
            email: user.email,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    // ---- private helpers ----

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn profiles_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.base_url)
    }

    /// Request with the project key; `bearer` defaults to the anon key.
    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str()))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message: provider_message(&body)
                    .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn token(&self, grant_type: &str, body: serde_json::Value) -> Result<AuthSession, AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("token"), None)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = Self::parse_response(response).await?;
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("signup"), None)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;
        let body: serde_json::Value = Self::parse_response(response).await?;
        sign_up_outcome(body, Utc::now())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("logout"), Some(access_token))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("recover"), None)
            .query(&[("redirect_to", redirect_to)])
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.token(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn find_email_by_badge(&self, badge_id: &str) -> Result<Option<String>, AuthError> {
        let response = self
            .request(reqwest::Method::GET, self.profiles_url(), None)
            .query(&[
                ("select", "email".to_string()),
                ("badge_id", format!("eq.{badge_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<EmailRow> = Self::parse_response(response).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.email)
            .filter(|email| !email.is_empty()))
    }

    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Profile, AuthError> {
        let response = self
            .request(reqwest::Method::GET, self.profiles_url(), Some(access_token))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))])
            .send()
            .await?;
        let rows: Vec<Profile> = Self::parse_response(response).await?;
        rows.into_iter().next().ok_or_else(|| AuthError::ProfileNotFound {
            user_id: user_id.to_string(),
        })
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        let response = self
            .request(reqwest::Method::PATCH, self.profiles_url(), Some(access_token))
            .query(&[("id", format!("eq.{user_id}"))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;
        let rows: Vec<Profile> = Self::parse_response(response).await?;
        rows.into_iter().next().ok_or_else(|| AuthError::ProfileNotFound {
            user_id: user_id.to_string(),
        })
    }
}

/// Human-readable message from a GoTrue or PostgREST error body.
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Sign-up replies carry a full session when auto-confirm is on, and
/// only the user otherwise (either bare or under `user`).
fn sign_up_outcome(
    body: serde_json::Value,
    now: DateTime<Utc>,
) -> Result<SignUpOutcome, AuthError> {
    let malformed = |e: serde_json::Error| AuthError::Provider {
        status: 200,
        message: format!("Unexpected sign-up response: {e}"),
    };

    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body).map_err(malformed)?;
        let session = token.into_session(now);
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    let user: UserResponse = serde_json::from_value(user_value).map_err(malformed)?;
    Ok(SignUpOutcome {
        user: user.into(),
        session: None,
    })
}
