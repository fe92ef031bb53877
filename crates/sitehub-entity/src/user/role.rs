//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the platform.
///
/// Roles are ordered by privilege level: Admin > Manager > User.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full platform administrator.
    Admin,
    /// Can be assigned as a delegated project manager.
    Manager,
    /// Regular user; owns the projects they create.
    User,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Manager => 2,
            Self::User => 1,
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = sitehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            _ => Err(sitehub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, manager, user"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.privilege_level() > UserRole::Manager.privilege_level());
        assert!(UserRole::Manager.privilege_level() > UserRole::User.privilege_level());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("superuser".parse::<UserRole>().is_err());
    }
}
