//! Journalist model
//!
//! A Journalist row is an application record created when a user applies for
//! a journalist account. It holds a weak reference to the applying user;
//! approval promotes that user's role in a separate step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Journalist application entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journalist {
    /// Unique identifier
    pub id: i64,
    /// Applying user ID (weak reference, no ownership)
    pub user_id: i64,
    /// Application status
    pub status: ApplicationStatus,
    /// Soft-deletion marker
    pub is_deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Journalist application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Pending - awaiting review
    Pending,
    /// Approved - the linked user is (or will be) promoted
    Approved,
    /// Rejected - application declined
    Rejected,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ApplicationStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
