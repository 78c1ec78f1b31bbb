//! TrafficEye auth-state event bus.
//!
//! - [`AuthEventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; the auth service publishes, the session
//!   controller listens.
//! - [`AuthEvent`]: sign-in, sign-out, token refresh and friends.
//! - [`Subscription`]: a running listener that is torn down when the
//!   handle is dropped.

pub mod bus;
pub mod subscription;

pub use bus::{AuthEvent, AuthEventBus, AuthEventKind};
pub use subscription::Subscription;
