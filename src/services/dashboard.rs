use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use garde::Validate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::store::{MatchStore, StoreError};
use crate::models::dashboard::{MatchCounts, Page};
use crate::models::filter::{FilterModel, SortOption};
use crate::models::job::{EvaluationStatus, JobWithEvaluation};
use crate::services::auth::AuthenticatedUser;
use crate::services::query_composer::{compose, EvaluationQuery};

/// Read path behind the match dashboard.
///
/// Both entry points are fail-soft: a missing user or a store failure yields
/// an empty page or zero counts, never an error.
pub struct DashboardService {
    store: Arc<dyn MatchStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// One page of the user's matches under `filters` and `sort`.
    pub async fn load_page(
        &self,
        user: Option<&AuthenticatedUser>,
        page: Page,
        filters: &FilterModel,
        sort: SortOption,
    ) -> Vec<JobWithEvaluation> {
        self.load_page_at(user, page, filters, sort, Utc::now()).await
    }

    pub async fn load_page_at(
        &self,
        user: Option<&AuthenticatedUser>,
        page: Page,
        filters: &FilterModel,
        sort: SortOption,
        now: DateTime<Utc>,
    ) -> Vec<JobWithEvaluation> {
        metrics::counter!("dashboard_page_requests_total").increment(1);

        let Some(user) = user else {
            debug!("load_page without authenticated user, returning empty page");
            return Vec::new();
        };
        if let Err(report) = page.validate() {
            warn!(user_id = %user.id(), error = %report, "Rejected page window");
            return Vec::new();
        }

        let pipeline = compose(user, filters, sort, now);
        let started = Instant::now();
        let fetched = self.store.fetch_page(&pipeline.store_query, page).await;
        record_latency("load_page", started);

        match fetched {
            Ok(rows) => {
                let fetched_len = rows.len();
                let rows = pipeline.post_filter.apply(rows);
                debug!(
                    user_id = %user.id(),
                    offset = page.offset,
                    limit = page.limit,
                    fetched = fetched_len,
                    returned = rows.len(),
                    "Loaded match page"
                );
                rows
            }
            Err(e) => {
                record_failure("load_page", user, &e);
                Vec::new()
            }
        }
    }

    /// Filtered count under `filters` and the baseline count (everything but
    /// hidden).
    pub async fn get_counts(
        &self,
        user: Option<&AuthenticatedUser>,
        filters: &FilterModel,
    ) -> MatchCounts {
        self.get_counts_at(user, filters, Utc::now()).await
    }

    pub async fn get_counts_at(
        &self,
        user: Option<&AuthenticatedUser>,
        filters: &FilterModel,
        now: DateTime<Utc>,
    ) -> MatchCounts {
        metrics::counter!("dashboard_count_requests_total").increment(1);

        let Some(user) = user else {
            debug!("get_counts without authenticated user, returning zero counts");
            return MatchCounts::default();
        };

        let started = Instant::now();
        let total_count = match self.store.count(&EvaluationQuery::baseline(user)).await {
            Ok(count) => count,
            Err(e) => {
                record_failure("count_total", user, &e);
                return MatchCounts::default();
            }
        };

        if !filters.has_active_filters() {
            record_latency("get_counts", started);
            return MatchCounts {
                filtered_count: total_count,
                total_count,
            };
        }

        let pipeline = compose(user, filters, SortOption::default(), now);
        let filtered = if pipeline.post_filter.is_active() {
            self.store
                .fetch_match_keys(&pipeline.store_query)
                .await
                .map(|keys| pipeline.post_filter.count(&keys))
        } else {
            self.store.count(&pipeline.store_query).await
        };
        record_latency("get_counts", started);

        let filtered_count = filtered.unwrap_or_else(|e| {
            record_failure("count_filtered", user, &e);
            0
        });

        MatchCounts {
            filtered_count,
            total_count,
        }
    }

    /// Apply a save/apply/hide/view action. Last write wins.
    pub async fn update_status(
        &self,
        user: &AuthenticatedUser,
        evaluation_id: Uuid,
        status: EvaluationStatus,
    ) -> Result<bool, StoreError> {
        let updated = self.store.update_status(user, evaluation_id, status).await?;
        metrics::counter!("dashboard_status_updates_total", "status" => status.as_str())
            .increment(1);
        debug!(user_id = %user.id(), %evaluation_id, %status, updated, "Status update");
        Ok(updated)
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }
}

fn record_latency(operation: &'static str, started: Instant) {
    metrics::histogram!("dashboard_query_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

fn record_failure(operation: &'static str, user: &AuthenticatedUser, error: &StoreError) {
    metrics::counter!("dashboard_store_failures_total", "operation" => operation).increment(1);
    warn!(user_id = %user.id(), operation, error = %error, "Store query failed, degrading to empty result");
}
