use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::store::{MatchStore, StoreError};
use crate::models::dashboard::Page;
use crate::models::filter::SortOption;
use crate::models::job::{Evaluation, EvaluationStatus, Job, JobWithEvaluation, MatchKey};
use crate::services::auth::AuthenticatedUser;
use crate::services::query_composer::EvaluationQuery;

#[derive(Default)]
struct Tables {
    jobs: HashMap<String, Job>,
    evaluations: Vec<Evaluation>,
}

/// Process-local match store with the same predicate and ordering semantics
/// as [`PgMatchStore`](crate::db::PgMatchStore).
#[derive(Default)]
pub struct InMemoryMatchStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_job(&self, job: Job) {
        self.tables
            .write()
            .await
            .jobs
            .insert(job.fingerprint.clone(), job);
    }

    pub async fn insert_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.evaluations.iter().any(|existing| {
            existing.user_id == evaluation.user_id
                && existing.job_fingerprint == evaluation.job_fingerprint
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "evaluation for user {} and job {} already exists",
                evaluation.user_id, evaluation.job_fingerprint
            )));
        }
        tables.evaluations.push(evaluation);
        Ok(())
    }

    /// Make every subsequent call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store set to fail".to_string()));
        }
        Ok(())
    }

    /// Inner join of matching evaluations to their jobs, in query order.
    async fn select(&self, query: &EvaluationQuery) -> Vec<JobWithEvaluation> {
        let tables = self.tables.read().await;
        let mut rows: Vec<JobWithEvaluation> = tables
            .evaluations
            .iter()
            .filter(|evaluation| query.matches(evaluation))
            .filter_map(|evaluation| {
                tables.jobs.get(&evaluation.job_fingerprint).map(|job| JobWithEvaluation {
                    evaluation: evaluation.clone(),
                    job: job.clone(),
                })
            })
            .collect();

        rows.sort_by(|a, b| compare_rows(query.sort(), a, b));
        rows
    }
}

fn compare_rows(sort: SortOption, a: &JobWithEvaluation, b: &JobWithEvaluation) -> Ordering {
    let primary = match sort {
        SortOption::ScoreDesc => b
            .evaluation
            .score_total
            .total_cmp(&a.evaluation.score_total),
        SortOption::DateDesc => nulls_last(a.job.posted_at, b.job.posted_at, |x, y| y.cmp(&x)),
        SortOption::DateAsc => nulls_last(a.job.posted_at, b.job.posted_at, |x, y| x.cmp(&y)),
    };
    primary.then_with(|| a.evaluation.id.cmp(&b.evaluation.id))
}

fn nulls_last(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    cmp: impl Fn(DateTime<Utc>, DateTime<Utc>) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn fetch_page(
        &self,
        query: &EvaluationQuery,
        page: Page,
    ) -> Result<Vec<JobWithEvaluation>, StoreError> {
        self.ensure_available()?;
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);

        Ok(self
            .select(query)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, query: &EvaluationQuery) -> Result<u64, StoreError> {
        self.ensure_available()?;
        Ok(self.select(query).await.len() as u64)
    }

    async fn fetch_match_keys(&self, query: &EvaluationQuery) -> Result<Vec<MatchKey>, StoreError> {
        self.ensure_available()?;
        Ok(self
            .select(query)
            .await
            .into_iter()
            .map(|row| MatchKey {
                evaluation_id: row.evaluation.id,
                score_total: row.evaluation.score_total,
                posted_at: row.job.posted_at,
            })
            .collect())
    }

    async fn update_status(
        &self,
        user: &AuthenticatedUser,
        evaluation_id: Uuid,
        status: EvaluationStatus,
    ) -> Result<bool, StoreError> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        match tables
            .evaluations
            .iter_mut()
            .find(|evaluation| evaluation.id == evaluation_id && evaluation.user_id == user.id())
        {
            Some(evaluation) => {
                evaluation.status = status;
                evaluation.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::FilterModel;
    use crate::models::job::ScoreBreakdown;
    use crate::services::query_composer::compose;
    use chrono::Duration;

    fn job(fingerprint: &str, posted_at: Option<DateTime<Utc>>) -> Job {
        Job {
            fingerprint: fingerprint.to_string(),
            title: format!("Engineer {fingerprint}"),
            company: "Acme".to_string(),
            location: None,
            remote_mode: None,
            seniority: None,
            salary_min: None,
            salary_max: None,
            salary_currency: None,
            description: None,
            source: "test".to_string(),
            apply_url: None,
            posted_at,
            scraped_at: Utc::now(),
        }
    }

    fn evaluation(user: &AuthenticatedUser, fingerprint: &str, score: f64) -> Evaluation {
        let now = Utc::now();
        Evaluation {
            id: Uuid::new_v4(),
            user_id: user.id(),
            job_fingerprint: fingerprint.to_string(),
            score_total: score,
            breakdown: ScoreBreakdown::default(),
            status: EvaluationStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_evaluation_rejected() {
        let store = InMemoryMatchStore::new();
        let user = AuthenticatedUser::new(Uuid::new_v4());
        store.insert_evaluation(evaluation(&user, "a", 8.0)).await.unwrap();

        let err = store.insert_evaluation(evaluation(&user, "a", 9.0)).await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_date_sort_puts_missing_dates_last() {
        let store = InMemoryMatchStore::new();
        let user = AuthenticatedUser::new(Uuid::new_v4());
        let now = Utc::now();
        store.upsert_job(job("old", Some(now - Duration::days(3)))).await;
        store.upsert_job(job("new", Some(now))).await;
        store.upsert_job(job("undated", None)).await;
        for fp in ["old", "new", "undated"] {
            store.insert_evaluation(evaluation(&user, fp, 7.0)).await.unwrap();
        }

        for (sort, expected) in [
            (SortOption::DateDesc, ["new", "old", "undated"]),
            (SortOption::DateAsc, ["old", "new", "undated"]),
        ] {
            let query = compose(&user, &FilterModel::empty(), sort, now).store_query;
            let rows = store.fetch_page(&query, Page::first(10)).await.unwrap();
            let order: Vec<&str> = rows.iter().map(|r| r.job.fingerprint.as_str()).collect();
            assert_eq!(order, expected);
        }
    }

    #[tokio::test]
    async fn test_evaluation_without_job_is_not_joined() {
        let store = InMemoryMatchStore::new();
        let user = AuthenticatedUser::new(Uuid::new_v4());
        store.insert_evaluation(evaluation(&user, "orphan", 9.0)).await.unwrap();

        let query = EvaluationQuery::baseline(&user);
        assert_eq!(store.count(&query).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_status_requires_ownership() {
        let store = InMemoryMatchStore::new();
        let owner = AuthenticatedUser::new(Uuid::new_v4());
        let stranger = AuthenticatedUser::new(Uuid::new_v4());
        let eval = evaluation(&owner, "a", 8.0);
        let id = eval.id;
        store.insert_evaluation(eval).await.unwrap();

        assert!(!store.update_status(&stranger, id, EvaluationStatus::Hidden).await.unwrap());
        assert!(store.update_status(&owner, id, EvaluationStatus::Saved).await.unwrap());
    }

    #[tokio::test]
    async fn test_failure_switch() {
        let store = InMemoryMatchStore::new();
        store.set_failing(true);
        assert!(matches!(store.health_check().await, Err(StoreError::Unavailable(_))));
        store.set_failing(false);
        assert!(store.health_check().await.is_ok());
    }
}
