use async_trait::async_trait;
use trafficeye_core::profile::{Profile, ProfileUpdate};
use trafficeye_core::session::AuthUser;

use crate::error::AuthError;
use crate::session::AuthSession;

/// Result of a sign-up. `session` is absent when the service requires
/// email confirmation before the first sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Contract to the hosted identity and profile service.
///
/// Every call is safe for the caller to retry with the same input.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. `metadata` becomes the user's metadata, from
    /// which the service creates the profile row.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
        -> Result<(), AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    /// Email of the profile with this badge id, if any.
    async fn find_email_by_badge(&self, badge_id: &str) -> Result<Option<String>, AuthError>;

    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Profile, AuthError>;

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError>;
}
