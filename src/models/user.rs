//! User model
//!
//! This module defines the User entity and the role enumeration used for
//! authorization decisions across the moderation workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Users carry one of three roles (Reader, Journalist, Admin) and are
/// soft-deleted rather than removed: `is_deleted` hides the account from
/// active listings while articles and comments referencing it stay intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub full_name: String,
    /// Email address (unique)
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Soft-deletion marker
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    pub fn new(full_name: String, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            full_name,
            email,
            role,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user holds a journalist account
    pub fn is_journalist(&self) -> bool {
        self.role == UserRole::Journalist
    }

    /// Check if the account is visible in active listings
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// User role for authorization.
///
/// - Reader: default role for new accounts
/// - Journalist: may author articles
/// - Admin: runs the moderation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Reader - default role
    Reader,
    /// Journalist - may author articles
    Journalist,
    /// Administrator - full access
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Reader
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Reader => write!(f, "reader"),
            UserRole::Journalist => write!(f, "journalist"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reader" => Ok(UserRole::Reader),
            "journalist" => Ok(UserRole::Journalist),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name
    pub full_name: String,
    /// Email address
    pub email: String,
    /// User role (optional, defaults to Reader)
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "Test Reader".to_string(),
            "test@example.com".to_string(),
            UserRole::Reader,
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.full_name, "Test Reader");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, UserRole::Reader);
        assert!(!user.is_deleted);
    }

    #[test]
    fn test_user_is_admin() {
        let admin = User::new("Admin".to_string(), "admin@test.com".to_string(), UserRole::Admin);
        let journalist = User::new("Jo".to_string(), "jo@test.com".to_string(), UserRole::Journalist);
        let reader = User::new("Reader".to_string(), "reader@test.com".to_string(), UserRole::Reader);

        assert!(admin.is_admin());
        assert!(!journalist.is_admin());
        assert!(!reader.is_admin());
    }

    #[test]
    fn test_user_is_active() {
        let mut user = User::new("U".to_string(), "u@test.com".to_string(), UserRole::Reader);
        assert!(user.is_active());
        user.is_deleted = true;
        assert!(!user.is_active());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Reader.to_string(), "reader");
        assert_eq!(UserRole::Journalist.to_string(), "journalist");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("Journalist").unwrap(), UserRole::Journalist);
        assert_eq!(UserRole::from_str("reader").unwrap(), UserRole::Reader);
        assert!(UserRole::from_str("editor").is_err());
        assert!(UserRole::from_str("").is_err());
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::Reader);
    }
}
