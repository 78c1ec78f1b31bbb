//! High-level auth operations used by the app flows.
//!
//! Input is validated before any provider call. Successful sign-in,
//! refresh, and sign-out persist (or clear) the session in the key/value
//! store and publish the matching [`AuthEvent`] on the bus.

use std::sync::Arc;

use chrono::Utc;
use trafficeye_core::profile::{Profile, ProfileUpdate};
use trafficeye_core::roles::Role;
use trafficeye_core::validation::{require_fields, validate_email};
use trafficeye_events::{AuthEvent, AuthEventBus, AuthEventKind};

use crate::error::AuthError;
use crate::forms::{CitizenSignUp, OfficerSignUp};
use crate::provider::{IdentityProvider, SignUpOutcome};
use crate::session::AuthSession;
use crate::storage::{KeyValueStore, SESSION_KEY};

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn KeyValueStore>,
    bus: Arc<AuthEventBus>,
    reset_redirect_to: String,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn KeyValueStore>,
        bus: Arc<AuthEventBus>,
        reset_redirect_to: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            bus,
            reset_redirect_to: reset_redirect_to.into(),
        }
    }

    pub fn bus(&self) -> &Arc<AuthEventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Sign up / sign in
    // -----------------------------------------------------------------------

    pub async fn sign_up_citizen(&self, form: &CitizenSignUp) -> Result<SignUpOutcome, AuthError> {
        form.validate()?;
        let metadata = serde_json::json!({
            "full_name": form.full_name.trim(),
            "phone": form.phone.trim(),
            "role": Role::Citizen.as_str(),
            "referral_code": form.referral_code(),
        });
        self.sign_up(form.email.trim(), &form.password, metadata).await
    }

    pub async fn sign_up_officer(&self, form: &OfficerSignUp) -> Result<SignUpOutcome, AuthError> {
        form.validate()?;
        let metadata = serde_json::json!({
            "full_name": form.full_name.trim(),
            "role": Role::Officer.as_str(),
            "badge_id": form.badge_id.trim(),
            "department": form.department.trim(),
            "jurisdiction": form.jurisdiction.trim(),
        });
        self.sign_up(form.email.trim(), &form.password, metadata).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.provider.sign_up(email, password, metadata).await?;
        tracing::info!(
            user_id = %outcome.user.id,
            confirmed = outcome.session.is_some(),
            "Account created"
        );
        if let Some(session) = &outcome.session {
            self.establish(session, AuthEventKind::SignedIn).await?;
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        require_fields(&[("Email", email), ("Password", password)])?;
        validate_email(email)?;

        let session = self
            .provider
            .sign_in_with_password(email.trim(), password)
            .await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.establish(&session, AuthEventKind::SignedIn).await?;
        Ok(session)
    }

    /// Officer sign-in: resolve the badge to an email, then sign in.
    ///
    /// An unknown badge (or a failed lookup) is reported as
    /// [`AuthError::InvalidCredential`] without attempting a sign-in.
    pub async fn sign_in_with_badge(
        &self,
        badge_id: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        require_fields(&[("Badge ID", badge_id), ("Password", password)])?;

        let email = match self.provider.find_email_by_badge(badge_id.trim()).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                tracing::info!(badge_id, "No profile for badge");
                return Err(AuthError::InvalidCredential);
            }
            Err(e) => {
                tracing::warn!(badge_id, error = %e, "Badge lookup failed");
                return Err(AuthError::InvalidCredential);
            }
        };

        self.sign_in(&email, password).await
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Clear the local session, announce the sign-out, then revoke the
    /// token remotely. A remote failure is returned but the local state is
    /// already cleared.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.current_session().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read session during sign-out");
            None
        });

        let cleared = self.store.remove(SESSION_KEY).await;
        self.bus.publish(AuthEvent::signed_out());
        cleared?;

        if let Some(session) = session {
            tracing::info!(user_id = %session.user.id, "Signed out");
            self.provider.sign_out(&session.access_token).await?;
        }
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;
        self.provider
            .reset_password_for_email(email.trim(), &self.reset_redirect_to)
            .await?;
        tracing::info!("Password reset email requested");
        Ok(())
    }

    /// The persisted session, if any. A corrupt entry is discarded.
    pub async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(raw) = self.store.get(SESSION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored session");
                self.store.remove(SESSION_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn refresh_session(&self) -> Result<AuthSession, AuthError> {
        let current = self
            .current_session()
            .await?
            .ok_or(AuthError::NotAuthenticated)?;
        let session = self.provider.refresh_session(&current.refresh_token).await?;
        tracing::debug!(user_id = %session.user.id, "Session refreshed");
        self.establish(&session, AuthEventKind::TokenRefreshed).await?;
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        let session = self
            .current_session()
            .await?
            .ok_or(AuthError::NotAuthenticated)?;
        self.provider
            .get_profile(&session.access_token, user_id)
            .await
    }

    /// Validate and stamp `update`, write it, and announce the change so
    /// session holders re-fetch the profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        update.validate()?;
        let session = self
            .current_session()
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        let profile = self
            .provider
            .update_profile(&session.access_token, user_id, &update.stamped(Utc::now()))
            .await?;
        tracing::info!(user_id, "Profile updated");
        self.bus
            .publish(AuthEvent::new(AuthEventKind::UserUpdated, Some(session.user)));
        Ok(profile)
    }

    // ---- private helpers ----

    async fn establish(&self, session: &AuthSession, kind: AuthEventKind) -> Result<(), AuthError> {
        let raw = serde_json::to_string(session).map_err(crate::storage::StorageError::from)?;
        self.store.set(SESSION_KEY, &raw).await?;
        self.bus
            .publish(AuthEvent::new(kind, Some(session.user.clone())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use trafficeye_core::error::CoreError;
    use trafficeye_core::session::AuthUser;

    use super::*;
    use crate::storage::MemoryStore;

    // -----------------------------------------------------------------------
    // Fake provider
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<String>>,
        badge_email: Option<String>,
        badge_lookup_fails: bool,
        reject_password: Option<String>,
        sign_out_fails: bool,
        last_metadata: Mutex<Option<serde_json::Value>>,
        last_update: Mutex<Option<ProfileUpdate>>,
    }

    impl FakeProvider {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn session(email: &str, token: &str) -> AuthSession {
            AuthSession {
                access_token: token.to_string(),
                refresh_token: format!("{token}-refresh"),
                expires_at: None,
                user: AuthUser {
                    id: "user-1".to_string(),
                    email: Some(email.to_string()),
                },
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            metadata: serde_json::Value,
        ) -> Result<SignUpOutcome, AuthError> {
            self.record(format!("sign_up:{email}"));
            *self.last_metadata.lock().unwrap() = Some(metadata);
            Ok(SignUpOutcome {
                user: AuthUser {
                    id: "user-1".into(),
                    email: Some(email.into()),
                },
                session: None,
            })
        }

        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<AuthSession, AuthError> {
            self.record(format!("sign_in:{email}"));
            if self.reject_password.as_deref() == Some(password) {
                return Err(AuthError::Provider {
                    status: 400,
                    message: "Invalid login credentials".into(),
                });
            }
            Ok(Self::session(email, "token-1"))
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
            self.record(format!("sign_out:{access_token}"));
            if self.sign_out_fails {
                return Err(AuthError::Provider {
                    status: 500,
                    message: "logout failed".into(),
                });
            }
            Ok(())
        }

        async fn reset_password_for_email(
            &self,
            email: &str,
            redirect_to: &str,
        ) -> Result<(), AuthError> {
            self.record(format!("reset:{email}:{redirect_to}"));
            Ok(())
        }

        async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
            self.record(format!("refresh:{refresh_token}"));
            Ok(Self::session("a@b.co", "token-2"))
        }

        async fn find_email_by_badge(&self, badge_id: &str) -> Result<Option<String>, AuthError> {
            self.record(format!("badge:{badge_id}"));
            if self.badge_lookup_fails {
                return Err(AuthError::Provider {
                    status: 406,
                    message: "JSON object requested, multiple (or no) rows returned".into(),
                });
            }
            Ok(self.badge_email.clone())
        }

        async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Profile, AuthError> {
            self.record(format!("get_profile:{access_token}:{user_id}"));
            Err(AuthError::ProfileNotFound {
                user_id: user_id.into(),
            })
        }

        async fn update_profile(
            &self,
            _access_token: &str,
            user_id: &str,
            update: &ProfileUpdate,
        ) -> Result<Profile, AuthError> {
            self.record(format!("update_profile:{user_id}"));
            *self.last_update.lock().unwrap() = Some(update.clone());
            Ok(Profile {
                id: user_id.into(),
                role: Role::Citizen,
                full_name: update.full_name.clone().unwrap_or_default(),
                email: None,
                phone: None,
                badge_id: None,
                department: None,
                jurisdiction: None,
                points: Some(0),
                referral_code: None,
                updated_at: update.updated_at,
            })
        }
    }

    fn service(provider: FakeProvider) -> (AuthService, Arc<FakeProvider>, Arc<MemoryStore>) {
        let provider = Arc::new(provider);
        let store = Arc::new(MemoryStore::new());
        let service = AuthService::new(
            provider.clone(),
            store.clone(),
            Arc::new(AuthEventBus::default()),
            "trafficeye://reset-password",
        );
        (service, provider, store)
    }

    // -----------------------------------------------------------------------
    // Badge sign-in
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unknown_badge_is_invalid_credential_without_sign_in() {
        let (service, provider, _) = service(FakeProvider::default());
        let err = service.sign_in_with_badge("B123", "pw1234").await.unwrap_err();
        assert_matches!(err, AuthError::InvalidCredential);
        assert_eq!(err.to_string(), "Invalid credential");
        assert_eq!(provider.calls(), vec!["badge:B123"]);
    }

    #[tokio::test]
    async fn failed_badge_lookup_is_invalid_credential() {
        let (service, provider, _) = service(FakeProvider {
            badge_lookup_fails: true,
            ..Default::default()
        });
        assert_matches!(
            service.sign_in_with_badge("B123", "pw1234").await,
            Err(AuthError::InvalidCredential)
        );
        assert!(!provider.calls().iter().any(|c| c.starts_with("sign_in")));
    }

    #[tokio::test]
    async fn known_badge_delegates_to_sign_in() {
        let (service, provider, _) = service(FakeProvider {
            badge_email: Some("officer@police.gov".into()),
            ..Default::default()
        });
        let mut events = service.bus().subscribe();

        let session = service.sign_in_with_badge(" B123 ", "pw1234").await.unwrap();
        assert_eq!(session.user.email.as_deref(), Some("officer@police.gov"));
        assert_eq!(
            provider.calls(),
            vec!["badge:B123", "sign_in:officer@police.gov"]
        );
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::SignedIn);
    }

    #[tokio::test]
    async fn blank_badge_never_reaches_provider() {
        let (service, provider, _) = service(FakeProvider::default());
        let err = service.sign_in_with_badge("  ", "pw1234").await.unwrap_err();
        assert!(err.is_validation());
        assert!(provider.calls().is_empty());
    }

    // -----------------------------------------------------------------------
    // Sign in / out
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn sign_in_persists_session() {
        let (service, _, _) = service(FakeProvider::default());
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let stored = service.current_session().await.unwrap().unwrap();
        assert_eq!(stored.access_token, "token-1");
    }

    #[tokio::test]
    async fn provider_error_message_is_verbatim() {
        let (service, _, _) = service(FakeProvider {
            reject_password: Some("wrong1".into()),
            ..Default::default()
        });
        let err = service.sign_in("asha@example.com", "wrong1").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(service.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_provider() {
        let (service, provider, _) = service(FakeProvider::default());
        let err = service.sign_in("not-an-email", "secret1").await.unwrap_err();
        assert_matches!(err, AuthError::Core(CoreError::Validation(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn sign_out_clears_and_announces() {
        let (service, provider, _) = service(FakeProvider::default());
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let mut events = service.bus().subscribe();

        service.sign_out().await.unwrap();

        assert!(service.current_session().await.unwrap().is_none());
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::SignedOut);
        assert!(provider.calls().contains(&"sign_out:token-1".to_string()));
    }

    #[tokio::test]
    async fn remote_sign_out_failure_still_clears_locally() {
        let (service, _, _) = service(FakeProvider {
            sign_out_fails: true,
            ..Default::default()
        });
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let err = service.sign_out().await.unwrap_err();
        assert_eq!(err.to_string(), "logout failed");
        assert!(service.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_requires_session() {
        let (service, _, _) = service(FakeProvider::default());
        assert_matches!(
            service.refresh_session().await,
            Err(AuthError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn refresh_exchanges_token_and_announces() {
        let (service, provider, _) = service(FakeProvider::default());
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let mut events = service.bus().subscribe();

        let session = service.refresh_session().await.unwrap();

        assert_eq!(session.access_token, "token-2");
        assert!(provider.calls().contains(&"refresh:token-1-refresh".to_string()));
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::TokenRefreshed);
        assert_eq!(
            service.current_session().await.unwrap().unwrap().access_token,
            "token-2"
        );
    }

    #[tokio::test]
    async fn corrupt_stored_session_is_discarded() {
        let (service, _, store) = service(FakeProvider::default());
        store.set(SESSION_KEY, "{broken").await.unwrap();
        assert!(service.current_session().await.unwrap().is_none());
        assert_eq!(store.get(SESSION_KEY).await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Sign up, reset, profile
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn citizen_sign_up_sends_role_metadata() {
        let (service, provider, _) = service(FakeProvider::default());
        let form = CitizenSignUp {
            email: "asha@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            full_name: " Asha Rao ".into(),
            phone: "9876543210".into(),
            referral_code: Some("trafficab12c".into()),
        };
        let outcome = service.sign_up_citizen(&form).await.unwrap();
        assert!(outcome.session.is_none());

        let metadata = provider.last_metadata.lock().unwrap().clone().unwrap();
        assert_eq!(metadata["role"], "citizen");
        assert_eq!(metadata["full_name"], "Asha Rao");
        assert_eq!(metadata["referral_code"], "TRAFFICAB12C");
    }

    #[tokio::test]
    async fn officer_sign_up_validation_blocks_provider() {
        let (service, provider, _) = service(FakeProvider::default());
        let form = OfficerSignUp {
            email: "officer@police.gov".into(),
            password: "secret1".into(),
            full_name: "R. Singh".into(),
            ..Default::default()
        };
        assert!(service.sign_up_officer(&form).await.unwrap_err().is_validation());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn reset_password_uses_redirect() {
        let (service, provider, _) = service(FakeProvider::default());
        service.reset_password(" asha@example.com ").await.unwrap();
        assert_eq!(
            provider.calls(),
            vec!["reset:asha@example.com:trafficeye://reset-password"]
        );
    }

    #[tokio::test]
    async fn profile_calls_need_a_session() {
        let (service, _, _) = service(FakeProvider::default());
        assert_matches!(
            service.get_profile("user-1").await,
            Err(AuthError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn update_profile_stamps_and_announces() {
        let (service, provider, _) = service(FakeProvider::default());
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let mut events = service.bus().subscribe();

        let update = ProfileUpdate {
            full_name: Some("Asha R.".into()),
            ..Default::default()
        };
        let profile = service.update_profile("user-1", &update).await.unwrap();

        assert_eq!(profile.full_name, "Asha R.");
        let sent = provider.last_update.lock().unwrap().clone().unwrap();
        assert!(sent.updated_at.is_some());
        assert_eq!(events.recv().await.unwrap().kind, AuthEventKind::UserUpdated);
    }

    #[tokio::test]
    async fn blank_name_update_rejected() {
        let (service, provider, _) = service(FakeProvider::default());
        service.sign_in("asha@example.com", "secret1").await.unwrap();
        let update = ProfileUpdate {
            full_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(service.update_profile("user-1", &update).await.unwrap_err().is_validation());
        assert!(!provider.calls().iter().any(|c| c.starts_with("update_profile")));
    }
}
