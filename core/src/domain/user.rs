//! User entity, roles, and self-service input types.

use crate::domain::UserId;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;

/// User role for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Regular customer.
    User,
    /// Tour guide.
    Guide,
    /// Lead tour guide.
    LeadGuide,
    /// Administrator.
    Admin,
}

impl Role {
    /// Canonical kebab-case name, as used in the API and the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Guide => "guide",
            Self::LeadGuide => "lead-guide",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may be assigned as a tour guide.
    #[must_use]
    pub const fn is_guide(&self) -> bool {
        matches!(self, Self::Guide | Self::LeadGuide)
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "guide" => Ok(Self::Guide),
            "lead-guide" => Ok(Self::LeadGuide),
            "admin" => Ok(Self::Admin),
            other => Err(Error::validation(format!("unknown role: {other}"))),
        }
    }
}

/// A user account.
///
/// The password hash and reset-token fields never serialize; inactive
/// accounts (soft-deleted) are excluded from all default repository reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique lowercase email address.
    pub email: String,
    /// Role, defaults to `user`.
    pub role: Role,
    /// Optional profile photo filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Bcrypt password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the password last changed. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_changed_at: Option<DateTime<Utc>>,
    /// SHA-256 digest of the outstanding reset token. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_reset_digest: Option<String>,
    /// Expiry of the outstanding reset token. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    /// Soft-delete flag. Never serialized.
    #[serde(skip_serializing, default = "default_active")]
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

const fn default_active() -> bool {
    true
}

impl User {
    /// Build a new active account with role `user`.
    #[must_use]
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: UserId::new(),
            name,
            email: email.to_lowercase(),
            role: Role::User,
            photo: None,
            password_hash,
            password_changed_at: None,
            password_reset_digest: None,
            password_reset_expires: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether the password changed after the given instant. Used by the
    /// auth boundary to invalidate credentials issued before a change.
    #[must_use]
    pub fn changed_password_after(&self, instant: DateTime<Utc>) -> bool {
        self.password_changed_at.is_some_and(|at| at > instant)
    }
}

/// Signup input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Confirmation copy of the password.
    pub password_confirm: String,
}

impl Signup {
    /// Validate signup constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("please tell us your name"));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(Error::validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        if self.password != self.password_confirm {
            return Err(Error::validation("passwords do not match"));
        }
        Ok(())
    }
}

/// Self-service profile update. Password and role changes go through their
/// own operations and are not representable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New profile photo filename.
    pub photo: Option<String>,
}

/// Admin-side user update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<Role>,
}

/// Minimal email shape check: one `@` with a dot somewhere after it.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the address is malformed.
pub fn validate_email(email: &str) -> Result<()> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(Error::validation("please provide a valid email"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn email_shape_check() {
        assert!(validate_email("lena@example.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn signup_requires_matching_passwords() {
        let signup = Signup {
            name: "Lena".to_string(),
            email: "lena@example.com".to_string(),
            password: "pass12345".to_string(),
            password_confirm: "different".to_string(),
        };
        assert!(matches!(signup.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = User::new(
            "Lena".to_string(),
            "Lena@Example.com".to_string(),
            "$2b$12$secret".to_string(),
        );
        assert_eq!(user.email, "lena@example.com");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn changed_password_after_compares_instants() {
        let mut user = User::new("A".into(), "a@b.co".into(), String::new());
        let issued = Utc::now();
        assert!(!user.changed_password_after(issued));
        user.password_changed_at = Some(issued + Duration::seconds(5));
        assert!(user.changed_password_after(issued));
    }
}
