use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use trafficeye_auth::storage::SESSION_KEY;
use trafficeye_auth::{
    AuthError, AuthService, AuthSession, IdentityProvider, KeyValueStore, MemoryStore,
    SignUpOutcome,
};
use trafficeye_core::profile::{Profile, ProfileUpdate};
use trafficeye_core::roles::Role;
use trafficeye_core::session::AuthUser;
use trafficeye_events::AuthEventBus;

/// In-memory identity service keyed by email.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, String>>,
    profiles: Mutex<HashMap<String, Profile>>,
    pub fail_profile: AtomicBool,
    pub hold_profile: AtomicBool,
    pub profile_entered: Notify,
    pub profile_release: Notify,
    pub profile_fetches: AtomicUsize,
}

impl FakeIdentity {
    pub fn add_account(&self, email: &str, profile: Profile) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), profile.id.clone());
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    pub fn set_points(&self, user_id: &str, points: i64) {
        if let Some(p) = self.profiles.lock().unwrap().get_mut(user_id) {
            p.points = Some(points);
        }
    }

    fn session_for(&self, email: &str) -> Result<AuthSession, AuthError> {
        let id = self
            .accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| AuthError::Provider {
                status: 400,
                message: "Invalid login credentials".into(),
            })?;
        Ok(session(&id, email))
    }
}

pub fn session(user_id: &str, email: &str) -> AuthSession {
    AuthSession {
        access_token: format!("{user_id}-token"),
        refresh_token: format!("{user_id}-refresh"),
        expires_at: None,
        user: AuthUser {
            id: user_id.to_string(),
            email: Some(email.to_string()),
        },
    }
}

pub fn profile(id: &str, role: Role) -> Profile {
    Profile {
        id: id.to_string(),
        role,
        full_name: format!("User {id}"),
        email: None,
        phone: None,
        badge_id: (role == Role::Officer).then(|| "B123".to_string()),
        department: None,
        jurisdiction: None,
        points: (role == Role::Citizen).then_some(0),
        referral_code: None,
        updated_at: None,
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, AuthError> {
        Err(AuthError::Provider {
            status: 501,
            message: "sign-up disabled".into(),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.session_for(email)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        _redirect_to: &str,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let user_id = refresh_token.trim_end_matches("-refresh");
        Ok(session(user_id, "refreshed@example.com"))
    }

    async fn find_email_by_badge(&self, badge_id: &str) -> Result<Option<String>, AuthError> {
        let profiles = self.profiles.lock().unwrap();
        let accounts = self.accounts.lock().unwrap();
        Ok(profiles
            .values()
            .find(|p| p.badge_id.as_deref() == Some(badge_id))
            .and_then(|p| {
                accounts
                    .iter()
                    .find(|(_, id)| **id == p.id)
                    .map(|(email, _)| email.clone())
            }))
    }

    async fn get_profile(&self, _access_token: &str, user_id: &str) -> Result<Profile, AuthError> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        if self.hold_profile.load(Ordering::SeqCst) {
            self.profile_entered.notify_one();
            self.profile_release.notified().await;
        }
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(AuthError::Provider {
                status: 503,
                message: "unavailable".into(),
            });
        }
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::ProfileNotFound {
                user_id: user_id.into(),
            })
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| AuthError::ProfileNotFound {
                user_id: user_id.into(),
            })?;
        if let Some(name) = &update.full_name {
            profile.full_name = name.clone();
        }
        profile.updated_at = update.updated_at;
        Ok(profile.clone())
    }
}

pub struct Fixture {
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<AuthService>,
}

impl Fixture {
    pub fn new() -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(AuthService::new(
            identity.clone(),
            store.clone(),
            Arc::new(AuthEventBus::default()),
            "trafficeye://reset-password",
        ));
        Self {
            identity,
            store,
            auth,
        }
    }

    pub async fn onboarded(self) -> Self {
        self.store.set("hasSeenOnboarding", "true").await.unwrap();
        self
    }

    pub async fn with_stored_session(self, user_id: &str, email: &str) -> Self {
        let raw = serde_json::to_string(&session(user_id, email)).unwrap();
        self.store.set(SESSION_KEY, &raw).await.unwrap();
        self
    }
}
