use async_trait::async_trait;
use uuid::Uuid;

use crate::models::dashboard::Page;
use crate::models::job::{EvaluationStatus, JobWithEvaluation, MatchKey};
use crate::services::auth::AuthenticatedUser;
use crate::services::query_composer::EvaluationQuery;

/// Query-and-mutate access to the `jobs` and `evaluations` tables.
///
/// Implementations evaluate every predicate of an [`EvaluationQuery`] and
/// order rows by its sort option, breaking ties by evaluation id so that
/// consecutive pages never reshuffle.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Joined rows for one page of `query`.
    async fn fetch_page(
        &self,
        query: &EvaluationQuery,
        page: Page,
    ) -> Result<Vec<JobWithEvaluation>, StoreError>;

    async fn count(&self, query: &EvaluationQuery) -> Result<u64, StoreError>;

    /// Every row of `query`, projected to what the date post-filter needs.
    async fn fetch_match_keys(&self, query: &EvaluationQuery) -> Result<Vec<MatchKey>, StoreError>;

    /// Set the status of one evaluation owned by `user`.
    /// Returns false when no such evaluation exists for that user.
    async fn update_status(
        &self,
        user: &AuthenticatedUser,
        evaluation_id: Uuid,
        status: EvaluationStatus,
    ) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode stored row: {0}")]
    Decode(String),

    #[error("Duplicate record: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
