//! Dashboard metrics service
//!
//! Read-only aggregation over the store: dashboard counters and the
//! monthly account-growth series. Snapshots reflect a single moment in
//! time; concurrent writes may cause small transient skew between the
//! individual counters, which is acceptable for a dashboard.

use crate::db::repositories::{
    ArticleRepository, CommentRepository, JournalistRepository, UserRepository,
};
use crate::models::ReviewCounts;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Month labels in calendar order, as rendered by the dashboard
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Error types for metrics operations
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Storage error; reads are side-effect free and always safe to retry
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

/// A point-in-time view of the dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub total_users: i64,
    pub articles: ReviewCounts,
    pub journalists: ReviewCounts,
    pub total_comments: i64,
}

/// One month of account creations, broken down by role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyGrowth {
    pub month: String,
    pub readers: i64,
    pub journalists: i64,
    pub admins: i64,
}

/// Metrics service deriving dashboard data from current store state
pub struct MetricsService {
    user_repo: Arc<dyn UserRepository>,
    journalist_repo: Arc<dyn JournalistRepository>,
    article_repo: Arc<dyn ArticleRepository>,
    comment_repo: Arc<dyn CommentRepository>,
}

impl MetricsService {
    /// Create a new metrics service
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        journalist_repo: Arc<dyn JournalistRepository>,
        article_repo: Arc<dyn ArticleRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            user_repo,
            journalist_repo,
            article_repo,
            comment_repo,
        }
    }

    /// Collect the dashboard counters
    pub async fn snapshot(&self) -> Result<DashboardSnapshot, MetricsError> {
        let total_users = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;
        let articles = self
            .article_repo
            .count_by_status()
            .await
            .context("Failed to count articles")?;
        let journalists = self
            .journalist_repo
            .count_by_status()
            .await
            .context("Failed to count journalists")?;
        let total_comments = self
            .comment_repo
            .count()
            .await
            .context("Failed to count comments")?;

        Ok(DashboardSnapshot {
            total_users,
            articles,
            journalists,
            total_comments,
        })
    }

    /// Monthly account growth for the given year.
    ///
    /// Always returns exactly twelve entries in calendar order; months with
    /// no account creations report zero counts rather than being omitted.
    pub async fn monthly_growth(&self, year: i32) -> Result<Vec<MonthlyGrowth>, MetricsError> {
        let rows = self
            .user_repo
            .role_counts_by_month(year)
            .await
            .context("Failed to aggregate monthly growth")?;

        let mut series: Vec<MonthlyGrowth> = MONTH_LABELS
            .iter()
            .map(|label| MonthlyGrowth {
                month: label.to_string(),
                readers: 0,
                journalists: 0,
                admins: 0,
            })
            .collect();

        for row in rows {
            if (1..=12).contains(&row.month) {
                let entry = &mut series[(row.month - 1) as usize];
                entry.readers = row.readers;
                entry.journalists = row.journalists;
                entry.admins = row.admins;
            }
        }

        Ok(series)
    }
}
