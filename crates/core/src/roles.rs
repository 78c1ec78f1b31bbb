//! Account roles.
//!
//! The string forms must match the `role` column of the `profiles` table
//! and the `role` key written into sign-up metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_CITIZEN: &str = "citizen";
pub const ROLE_OFFICER: &str = "officer";

/// Determines which flow is mounted after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Officer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => ROLE_CITIZEN,
            Role::Officer => ROLE_OFFICER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ROLE_CITIZEN => Ok(Role::Citizen),
            ROLE_OFFICER => Ok(Role::Officer),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_CITIZEN}, {ROLE_OFFICER}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_case_insensitively() {
        assert_eq!("citizen".parse::<Role>().unwrap(), Role::Citizen);
        assert_eq!(" Officer ".parse::<Role>().unwrap(), Role::Officer);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Invalid role 'admin'"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Officer).unwrap(), "\"officer\"");
        let role: Role = serde_json::from_str("\"citizen\"").unwrap();
        assert_eq!(role, Role::Citizen);
    }
}
