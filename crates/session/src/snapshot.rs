use serde::Serialize;
use trafficeye_core::profile::Profile;
use trafficeye_core::session::{resolve_view, AuthUser, LoadingState, SessionState, View};

/// One consistent view of the session, as published to observers.
///
/// `view` is always `resolve_view` of the other fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub view: View,
    pub loading: LoadingState,
    pub onboarding_seen: bool,
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
}

impl SessionSnapshot {
    pub fn of(state: &SessionState) -> Self {
        Self {
            view: resolve_view(state),
            loading: state.loading,
            onboarding_seen: state.onboarding_seen,
            user: state.user.clone(),
            profile: state.profile.clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
