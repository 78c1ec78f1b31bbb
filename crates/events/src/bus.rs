//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`AuthEventBus`] is designed to be shared via `Arc<AuthEventBus>`
//! between the auth service and the session controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use trafficeye_core::session::AuthUser;

// ---------------------------------------------------------------------------
// AuthEvent
// ---------------------------------------------------------------------------

/// What happened to the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// An auth-state change, carrying the user the session now belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    /// Present for every kind except `SignedOut`.
    pub user: Option<AuthUser>,
    pub timestamp: DateTime<Utc>,
}

impl AuthEvent {
    pub fn new(kind: AuthEventKind, user: Option<AuthUser>) -> Self {
        Self {
            kind,
            user,
            timestamp: Utc::now(),
        }
    }

    pub fn signed_in(user: AuthUser) -> Self {
        Self::new(AuthEventKind::SignedIn, Some(user))
    }

    pub fn signed_out() -> Self {
        Self::new(AuthEventKind::SignedOut, None)
    }

    pub fn token_refreshed(user: AuthUser) -> Self {
        Self::new(AuthEventKind::TokenRefreshed, Some(user))
    }
}

// ---------------------------------------------------------------------------
// AuthEventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use trafficeye_events::{AuthEvent, AuthEventBus};
///
/// let bus = AuthEventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AuthEvent::signed_out());
/// ```
pub struct AuthEventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: AuthEvent) {
        tracing::debug!(kind = ?event.kind, receivers = self.sender.receiver_count(), "Publishing auth event");
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
