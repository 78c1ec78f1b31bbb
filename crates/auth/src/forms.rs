//! Sign-up forms and their validation.

use trafficeye_core::error::CoreError;
use trafficeye_core::validation::{
    is_valid_badge_id, is_valid_phone, require_fields, validate_email, validate_new_password,
};

#[derive(Debug, Clone, Default)]
pub struct CitizenSignUp {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub phone: String,
    pub referral_code: Option<String>,
}

impl CitizenSignUp {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_fields(&[
            ("Full name", self.full_name.as_str()),
            ("Email", self.email.as_str()),
            ("Phone", self.phone.as_str()),
            ("Password", self.password.as_str()),
        ])?;
        validate_email(&self.email)?;
        if !is_valid_phone(self.phone.trim()) {
            return Err(CoreError::Validation(
                "Please enter a valid phone number".to_string(),
            ));
        }
        validate_new_password(&self.password, Some(&self.confirm_password))
    }

    /// Referral code as entered, `None` when left blank.
    pub fn referral_code(&self) -> Option<String> {
        self.referral_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfficerSignUp {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub badge_id: String,
    pub department: String,
    pub jurisdiction: String,
}

impl OfficerSignUp {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_fields(&[
            ("Full name", self.full_name.as_str()),
            ("Email", self.email.as_str()),
            ("Badge ID", self.badge_id.as_str()),
            ("Department", self.department.as_str()),
            ("Jurisdiction", self.jurisdiction.as_str()),
            ("Password", self.password.as_str()),
        ])?;
        validate_email(&self.email)?;
        if !is_valid_badge_id(&self.badge_id) {
            return Err(CoreError::Validation("Please enter your badge ID".to_string()));
        }
        validate_new_password(&self.password, None)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn citizen() -> CitizenSignUp {
        CitizenSignUp {
            email: "asha@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            full_name: "Asha Rao".into(),
            phone: "+91 98765 43210".into(),
            referral_code: None,
        }
    }

    fn officer() -> OfficerSignUp {
        OfficerSignUp {
            email: "officer@police.gov".into(),
            password: "secret1".into(),
            full_name: "R. Singh".into(),
            badge_id: "B123".into(),
            department: "Traffic".into(),
            jurisdiction: "North".into(),
        }
    }

    #[test]
    fn valid_citizen() {
        assert!(citizen().validate().is_ok());
    }

    #[test]
    fn citizen_first_missing_field_reported() {
        let form = CitizenSignUp {
            full_name: " ".into(),
            phone: String::new(),
            ..citizen()
        };
        assert_eq!(
            form.validate(),
            Err(CoreError::Validation("Full name is required".into()))
        );
    }

    #[test]
    fn citizen_bad_phone() {
        let form = CitizenSignUp {
            phone: "12345".into(),
            ..citizen()
        };
        assert_matches!(form.validate(), Err(CoreError::Validation(m)) if m.contains("phone"));
    }

    #[test]
    fn citizen_password_mismatch() {
        let form = CitizenSignUp {
            confirm_password: "secret2".into(),
            ..citizen()
        };
        assert_eq!(
            form.validate(),
            Err(CoreError::Validation("Passwords do not match".into()))
        );
    }

    #[test]
    fn referral_code_normalized() {
        let mut form = citizen();
        assert_eq!(form.referral_code(), None);
        form.referral_code = Some("  ".into());
        assert_eq!(form.referral_code(), None);
        form.referral_code = Some(" trafficab12c ".into());
        assert_eq!(form.referral_code().as_deref(), Some("TRAFFICAB12C"));
    }

    #[test]
    fn valid_officer() {
        assert!(officer().validate().is_ok());
    }

    #[test]
    fn officer_requires_badge() {
        let form = OfficerSignUp {
            badge_id: String::new(),
            ..officer()
        };
        assert_eq!(
            form.validate(),
            Err(CoreError::Validation("Badge ID is required".into()))
        );
    }

    #[test]
    fn officer_short_password() {
        let form = OfficerSignUp {
            password: "abc".into(),
            ..officer()
        };
        assert_matches!(form.validate(), Err(CoreError::Validation(_)));
    }
}
