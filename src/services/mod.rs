//! Services layer - Business logic
//!
//! This module contains the business logic of the Newsdesk backend.
//! Services are responsible for:
//! - Implementing the moderation and identity workflows
//! - Coordinating repositories across collections
//! - Handling validation and error cases

pub mod identity;
pub mod metrics;
pub mod moderation;

pub use identity::{DeletedIdentity, IdentityError, IdentityService};
pub use metrics::{DashboardSnapshot, MetricsError, MetricsService, MonthlyGrowth};
pub use moderation::{ModerationError, ModerationService};
