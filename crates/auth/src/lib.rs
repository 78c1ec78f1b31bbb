//! Identity and profile gateway.
//!
//! [`IdentityProvider`] is the contract to the hosted auth/database
//! service; [`SupabaseClient`] implements it over REST. [`AuthService`]
//! layers form validation, session persistence and auth-event
//! publication on top.

pub mod config;
pub mod error;
pub mod forms;
pub mod provider;
pub mod service;
pub mod session;
pub mod storage;
pub mod supabase;

pub use config::SupabaseConfig;
pub use error::AuthError;
pub use forms::{CitizenSignUp, OfficerSignUp};
pub use provider::{IdentityProvider, SignUpOutcome};
pub use service::AuthService;
pub use session::AuthSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use supabase::SupabaseClient;
