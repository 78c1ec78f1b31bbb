//! Session & role state machine.
//!
//! [`SessionController`] owns the process-wide [`SessionState`], listens
//! to the auth event bus, and republishes the routed [`View`] (with the
//! user and profile it was computed from) on a `watch` channel.
//!
//! [`SessionState`]: trafficeye_core::session::SessionState
//! [`View`]: trafficeye_core::session::View

pub mod controller;
pub mod snapshot;

pub use controller::{SessionController, SessionHandle};
pub use snapshot::SessionSnapshot;
