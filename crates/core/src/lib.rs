//! Domain logic for the TrafficEye violation-reporting client.
//!
//! Everything in this crate is pure: no I/O, no async. The service crates
//! (`trafficeye-auth`, `trafficeye-vision`, `trafficeye-pipeline`,
//! `trafficeye-session`) drive these types against real collaborators.

pub mod draft;
pub mod error;
pub mod extraction;
pub mod location;
pub mod notice;
pub mod profile;
pub mod roles;
pub mod session;
pub mod types;
pub mod validation;
pub mod verification;
pub mod violations;
