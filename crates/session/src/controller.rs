//! The session controller.
//!
//! Every mutation happens under one lock and republishes the snapshot
//! before the lock is released, so observers never see a user and
//! profile that disagree. Auth events, profile fetches and explicit calls
//! may interleave freely: each recomputes the view from current state.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use trafficeye_auth::storage::ONBOARDING_KEY;
use trafficeye_auth::{AuthError, AuthService};
use trafficeye_core::profile::{Profile, ProfileUpdate};
use trafficeye_core::session::{AuthUser, SessionState, View};
use trafficeye_events::{AuthEvent, AuthEventKind, Subscription};

use crate::snapshot::SessionSnapshot;

const ONBOARDING_SEEN: &str = "true";

pub struct SessionController {
    state: Mutex<SessionState>,
    tx: watch::Sender<SessionSnapshot>,
    auth: Arc<AuthService>,
}

/// A started controller and its bus subscription.
///
/// Dropping the handle (or calling [`SessionHandle::shutdown`]) stops
/// listening for auth events.
pub struct SessionHandle {
    controller: Arc<SessionController>,
    subscription: Subscription,
}

impl SessionHandle {
    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_active()
    }

    pub async fn shutdown(self) {
        self.subscription.unsubscribe().await;
        tracing::debug!("Session controller stopped");
    }
}

impl SessionController {
    /// A controller in the start-of-process state (splash).
    pub fn new(auth: Arc<AuthService>) -> Arc<Self> {
        let state = SessionState::new();
        let (tx, _) = watch::channel(SessionSnapshot::of(&state));
        Arc::new(Self {
            state: Mutex::new(state),
            tx,
            auth,
        })
    }

    /// Subscribe to auth events, then run the initial session check.
    ///
    /// The subscription is taken first so that no event published during
    /// the check is missed.
    pub async fn start(self: Arc<Self>) -> SessionHandle {
        let receiver = self.auth.bus().subscribe();
        let listener = Arc::clone(&self);
        let subscription = Subscription::spawn(receiver, move |event| {
            let controller = Arc::clone(&listener);
            async move { controller.handle_event(event).await }
        });

        self.check_session().await;

        SessionHandle {
            controller: self,
            subscription,
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn view(&self) -> View {
        self.tx.borrow().view
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Read the onboarding flag and the persisted session. Loading always
    /// finishes, whatever fails along the way.
    pub async fn check_session(&self) {
        let onboarding_seen = match self.auth.store().get(ONBOARDING_KEY).await {
            Ok(value) => value.as_deref() == Some(ONBOARDING_SEEN),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read onboarding flag");
                false
            }
        };
        self.mutate(|state| state.set_onboarding_seen(onboarding_seen));

        match self.auth.current_session().await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user.id, "Restored session");
                let user_id = session.user.id.clone();
                self.mutate(|state| state.set_user(session.user));
                self.fetch_profile(&user_id).await;
            }
            Ok(None) => tracing::debug!("No stored session"),
            Err(e) => tracing::error!(error = %e, "Session check failed"),
        }

        self.mutate(SessionState::finish_loading);
    }

    /// Apply one auth-state change.
    pub async fn handle_event(&self, event: AuthEvent) {
        tracing::debug!(kind = ?event.kind, "Auth state changed");
        match (event.kind, event.user) {
            (AuthEventKind::SignedOut, _) | (_, None) => {
                self.mutate(|state| {
                    state.sign_out();
                    state.finish_loading();
                });
            }
            (_, Some(user)) => {
                let user_id = user.id.clone();
                self.mutate(|state| state.set_user(user));
                self.fetch_profile(&user_id).await;
                self.mutate(SessionState::finish_loading);
            }
        }
    }

    /// Persist and apply the onboarding acknowledgement.
    pub async fn acknowledge_onboarding(&self) -> Result<(), AuthError> {
        self.mutate(|state| state.set_onboarding_seen(true));
        self.auth
            .store()
            .set(ONBOARDING_KEY, ONBOARDING_SEEN)
            .await?;
        Ok(())
    }

    /// Re-fetch the current user's profile. No-op when signed out.
    pub async fn refresh_profile(&self) {
        if let Some(user_id) = self.current_user().map(|u| u.id) {
            self.fetch_profile(&user_id).await;
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, AuthError> {
        let user = self.current_user().ok_or(AuthError::NotAuthenticated)?;
        let profile = self.auth.update_profile(&user.id, update).await?;
        self.apply_profile(profile.clone());
        Ok(profile)
    }

    /// Sign out: user and profile are cleared together in one published
    /// update, before the remote sign-out is attempted.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.mutate(SessionState::sign_out);
        self.auth.sign_out().await
    }

    // ---- private helpers ----

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock().user.clone()
    }

    fn mutate(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.lock();
        f(&mut state);
        let snapshot = SessionSnapshot::of(&state);
        let view = snapshot.view;
        let previous = self.tx.send_replace(snapshot);
        if previous.view != view {
            tracing::info!(from = ?previous.view, to = ?view, "View changed");
        }
    }

    async fn fetch_profile(&self, user_id: &str) {
        match self.auth.get_profile(user_id).await {
            Ok(profile) => self.apply_profile(profile),
            Err(e) => tracing::warn!(user_id, error = %e, "Profile fetch failed"),
        }
    }

    /// Attach `profile` unless the session has moved to another user.
    fn apply_profile(&self, profile: Profile) {
        let profile_id = profile.id.clone();
        let mut applied = false;
        self.mutate(|state| applied = state.set_profile(profile));
        if !applied {
            tracing::debug!(user_id = %profile_id, "Discarding profile for inactive session");
        }
    }
}
