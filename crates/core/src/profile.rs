//! Profile rows and profile updates.
//!
//! A [`Profile`] mirrors one row of the `profiles` table. Role-specific
//! columns are optional: officers carry badge/department/jurisdiction,
//! citizens carry points and a referral code.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::{Timestamp, UserId};

/// Prefix used when a citizen has no stored referral code.
pub const REFERRAL_PREFIX: &str = "TRAFFIC";

/// Suffix used when no user id is available either.
pub const REFERRAL_GUEST_SUFFIX: &str = "GUEST";

/// Number of user-id characters appended to [`REFERRAL_PREFIX`].
const REFERRAL_ID_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub badge_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Profile {
    /// Contact line shown on profile screens: email first, then phone.
    pub fn contact_info(&self) -> Option<&str> {
        self.email.as_deref().or(self.phone.as_deref())
    }

    /// Points balance; only citizens accumulate points.
    pub fn points_balance(&self) -> Option<i64> {
        match self.role {
            Role::Citizen => Some(self.points.unwrap_or(0)),
            Role::Officer => None,
        }
    }

    /// Referral code to display and share.
    ///
    /// Officers have none. Citizens get their stored code, or a code
    /// derived from their user id.
    pub fn referral_code(&self) -> Option<String> {
        if self.role != Role::Citizen {
            return None;
        }
        match self.referral_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(code.to_string()),
            _ => Some(derived_referral_code(Some(&self.id))),
        }
    }
}

/// Profile rows store `full_name` as a nullable column.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build the fallback referral code for a user id.
pub fn derived_referral_code(user_id: Option<&str>) -> String {
    match user_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let head: String = id.chars().take(REFERRAL_ID_CHARS).collect();
            format!("{REFERRAL_PREFIX}{}", head.to_uppercase())
        }
        None => format!("{REFERRAL_PREFIX}{REFERRAL_GUEST_SUFFIX}"),
    }
}

/// Partial update of a profile row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ProfileUpdate {
    /// Reject updates that would blank the display name or change nothing.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(CoreError::MissingField {
                    field: "full_name",
                    message: "Please enter your full name",
                });
            }
        }
        if self.is_empty() {
            return Err(CoreError::Validation("Nothing to update".to_string()));
        }
        Ok(())
    }

    /// Copy of this update stamped with the given modification time.
    pub fn stamped(&self, now: Timestamp) -> Self {
        Self {
            updated_at: Some(now),
            ..self.clone()
        }
    }

    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.jurisdiction.is_none()
    }
}
