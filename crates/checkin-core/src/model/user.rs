//! User accounts and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

use super::de;

/// Account role. Reps submit check-ins, supervisors review them, admins
/// additionally manage users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Rep,
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Rep => "rep",
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may list every rep's check-ins.
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rep" => Ok(Role::Rep),
            "supervisor" => Ok(Role::Supervisor),
            "admin" => Ok(Role::Admin),
            other => Err(InvalidInputError::Other {
                message: format!("unknown role '{}' (expected rep, supervisor or admin)", other),
            }),
        }
    }
}

/// A user as returned by `/api/auth/me`, `/api/auth/login` and `/api/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Self-service sign-up request body.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Admin-created account request body. Accounts created this way are
/// verified immediately by the backend.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("region", &self.region)
            .field("category", &self.category)
            .finish()
    }
}

/// Partial update for `PATCH /api/users/:id`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.region.is_none()
            && self.category.is_none()
            && self.verified.is_none()
            && self.active.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_accepts_numeric_id_and_missing_optionals() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "name": "Ada Rep",
            "email": "ada@example.com",
            "role": "rep",
            "region": "North"
        }))
        .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Rep);
        assert_eq!(user.region.as_deref(), Some("North"));
        assert!(user.created_at.is_none());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Supervisor".parse::<Role>().unwrap(), Role::Supervisor);
        assert!("manager".parse::<Role>().is_err());
        assert!(Role::Admin.can_review());
        assert!(!Role::Rep.can_review());
    }

    #[test]
    fn user_update_serializes_only_set_fields() {
        let update = UserUpdate {
            active: Some(false),
            region: Some("South".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"region": "South", "active": false})
        );
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn registration_debug_hides_password() {
        let reg = Registration {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            password: "pa55word".into(),
            role: None,
        };
        assert!(!format!("{:?}", reg).contains("pa55word"));
    }
}
