//! Session state and role-gated routing.
//!
//! [`resolve_view`] is the whole routing decision: it is recomputed from
//! scratch on every auth or profile change, never patched incrementally.
//! Rules apply in priority order:
//!
//! 1. still checking the stored session -> [`View::Splash`]
//! 2. onboarding not acknowledged -> [`View::Onboarding`]
//! 3. no user -> [`View::Unauthenticated`]
//! 4. user without profile -> [`View::ProfilePending`]
//! 5. / 6. user with profile -> [`View::Citizen`] or [`View::Officer`]

use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::roles::Role;
use crate::types::UserId;

/// Opaque identity handle from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    Checking,
    Ready,
}

/// Screens mounted by the unauthenticated flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthScreen {
    RoleSelection,
    CitizenSignIn,
    CitizenSignUp,
    OfficerSignIn,
    ForgotPassword,
}

pub const AUTH_SCREENS: &[AuthScreen] = &[
    AuthScreen::RoleSelection,
    AuthScreen::CitizenSignIn,
    AuthScreen::CitizenSignUp,
    AuthScreen::OfficerSignIn,
    AuthScreen::ForgotPassword,
];

/// Which subtree of the app is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Splash,
    Onboarding,
    Unauthenticated,
    /// A session exists but its profile fetch has not completed.
    ProfilePending,
    Citizen,
    Officer,
}

impl View {
    /// First screen shown when this view is mounted.
    pub fn entry_screen(self) -> &'static str {
        match self {
            View::Splash => "Splash",
            View::Onboarding => "Onboarding",
            View::Unauthenticated => "RoleSelection",
            View::ProfilePending => "Loading",
            View::Citizen => "CitizenHome",
            View::Officer => "OfficerDashboard",
        }
    }

    /// Auth screens reachable from this view. Empty outside the auth flow.
    pub fn auth_screens(self) -> &'static [AuthScreen] {
        match self {
            View::Unauthenticated => AUTH_SCREENS,
            View::Splash
            | View::Onboarding
            | View::ProfilePending
            | View::Citizen
            | View::Officer => &[],
        }
    }
}

/// Process-wide session fields the router reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub loading: LoadingState,
    pub onboarding_seen: bool,
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
}

impl SessionState {
    /// Start-of-process state: always checking.
    pub fn new() -> Self {
        Self {
            loading: LoadingState::Checking,
            onboarding_seen: false,
            user: None,
            profile: None,
        }
    }

    pub fn finish_loading(&mut self) {
        self.loading = LoadingState::Ready;
    }

    pub fn set_onboarding_seen(&mut self, seen: bool) {
        self.onboarding_seen = seen;
    }

    /// Record the signed-in user. A different user invalidates the profile.
    pub fn set_user(&mut self, user: AuthUser) {
        let same_user = self.user.as_ref().is_some_and(|u| u.id == user.id);
        if !same_user {
            self.profile = None;
        }
        self.user = Some(user);
    }

    /// Attach a fetched profile.
    ///
    /// Returns `false` (and leaves state untouched) when no user is signed
    /// in or the profile belongs to someone else, i.e. a fetch that
    /// completed after the session moved on.
    pub fn set_profile(&mut self, profile: Profile) -> bool {
        match &self.user {
            Some(user) if user.id == profile.id => {
                self.profile = Some(profile);
                true
            }
            _ => false,
        }
    }

    /// Clear user and profile together.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.profile = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn view(&self) -> View {
        resolve_view(self)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn resolve_view(state: &SessionState) -> View {
    if state.loading == LoadingState::Checking {
        return View::Splash;
    }
    if !state.onboarding_seen {
        return View::Onboarding;
    }
    match (&state.user, &state.profile) {
        (None, _) => View::Unauthenticated,
        (Some(_), None) => View::ProfilePending,
        (Some(_), Some(profile)) => match profile.role {
            Role::Citizen => View::Citizen,
            Role::Officer => View::Officer,
        },
    }
}
