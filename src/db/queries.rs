use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::store::{MatchStore, StoreError};
use crate::models::dashboard::Page;
use crate::models::filter::SortOption;
use crate::models::job::{
    Evaluation, EvaluationStatus, Job, JobWithEvaluation, MatchKey, ScoreBreakdown,
};
use crate::services::auth::AuthenticatedUser;
use crate::services::query_composer::{EvaluationQuery, StatusRule};

const MATCH_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.job_fingerprint, e.score_total, e.score_breakdown, e.status,
           e.created_at, e.updated_at,
           j.title, j.company, j.location, j.remote_mode, j.seniority,
           j.salary_min, j.salary_max, j.salary_currency, j.description,
           j.source, j.apply_url, j.posted_at, j.scraped_at
    FROM evaluations e
    JOIN jobs j ON j.fingerprint = e.job_fingerprint
"#;

const MATCH_FROM: &str = r#"
    FROM evaluations e
    JOIN jobs j ON j.fingerprint = e.job_fingerprint
"#;

/// Postgres-backed match store.
#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MatchRow {
    id: Uuid,
    user_id: Uuid,
    job_fingerprint: String,
    score_total: f64,
    score_breakdown: Json<ScoreBreakdown>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    title: String,
    company: String,
    location: Option<String>,
    remote_mode: Option<String>,
    seniority: Option<String>,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    salary_currency: Option<String>,
    description: Option<String>,
    source: String,
    apply_url: Option<String>,
    posted_at: Option<DateTime<Utc>>,
    scraped_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for JobWithEvaluation {
    type Error = StoreError;

    fn try_from(r: MatchRow) -> Result<Self, Self::Error> {
        let status: EvaluationStatus = r
            .status
            .parse()
            .map_err(|_| StoreError::Decode(format!("unknown evaluation status '{}'", r.status)))?;
        let remote_mode = r
            .remote_mode
            .map(|mode| {
                mode.parse()
                    .map_err(|_| StoreError::Decode(format!("unknown remote mode '{mode}'")))
            })
            .transpose()?;

        Ok(JobWithEvaluation {
            evaluation: Evaluation {
                id: r.id,
                user_id: r.user_id,
                job_fingerprint: r.job_fingerprint.clone(),
                score_total: r.score_total,
                breakdown: r.score_breakdown.0,
                status,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            job: Job {
                fingerprint: r.job_fingerprint,
                title: r.title,
                company: r.company,
                location: r.location,
                remote_mode,
                seniority: r.seniority,
                salary_min: r.salary_min,
                salary_max: r.salary_max,
                salary_currency: r.salary_currency,
                description: r.description,
                source: r.source,
                apply_url: r.apply_url,
                posted_at: r.posted_at,
                scraped_at: r.scraped_at,
            },
        })
    }
}

/// Append the owner scope, status rule and OR-combined score bounds.
fn push_predicates(builder: &mut QueryBuilder<'_, Postgres>, query: &EvaluationQuery) {
    builder.push(" WHERE e.user_id = ").push_bind(query.owner());

    match query.status_rule() {
        StatusRule::ExcludeHidden => {
            builder
                .push(" AND e.status <> ")
                .push_bind(EvaluationStatus::Hidden.as_str());
        }
        StatusRule::Include(statuses) if statuses.is_empty() => {
            builder.push(" AND FALSE");
        }
        StatusRule::Include(statuses) => {
            builder.push(" AND e.status IN (");
            let mut separated = builder.separated(", ");
            for status in statuses {
                separated.push_bind(status.as_str());
            }
            separated.push_unseparated(")");
        }
    }

    if !query.score_bounds().is_empty() {
        builder.push(" AND (");
        let mut separated = builder.separated(" OR ");
        for bound in query.score_bounds() {
            separated
                .push("(e.score_total >= ")
                .push_bind_unseparated(bound.min)
                .push_unseparated(" AND e.score_total <= ")
                .push_bind_unseparated(bound.max)
                .push_unseparated(")");
        }
        separated.push_unseparated(")");
    }
}

fn order_by(sort: SortOption) -> &'static str {
    match sort {
        SortOption::ScoreDesc => " ORDER BY e.score_total DESC, e.id ASC",
        SortOption::DateDesc => " ORDER BY j.posted_at DESC NULLS LAST, e.id ASC",
        SortOption::DateAsc => " ORDER BY j.posted_at ASC NULLS LAST, e.id ASC",
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn fetch_page(
        &self,
        query: &EvaluationQuery,
        page: Page,
    ) -> Result<Vec<JobWithEvaluation>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(MATCH_SELECT);
        push_predicates(&mut builder, query);
        builder
            .push(order_by(query.sort()))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows: Vec<MatchRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(JobWithEvaluation::try_from).collect()
    }

    async fn count(&self, query: &EvaluationQuery) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        builder.push(MATCH_FROM);
        push_predicates(&mut builder, query);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_match_keys(&self, query: &EvaluationQuery) -> Result<Vec<MatchKey>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT e.id, e.score_total, j.posted_at");
        builder.push(MATCH_FROM);
        push_predicates(&mut builder, query);

        let rows: Vec<(Uuid, f64, Option<DateTime<Utc>>)> =
            builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(evaluation_id, score_total, posted_at)| MatchKey {
                evaluation_id,
                score_total,
                posted_at,
            })
            .collect())
    }

    async fn update_status(
        &self,
        user: &AuthenticatedUser,
        evaluation_id: Uuid,
        status: EvaluationStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE evaluations
            SET status = $1,
                updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(evaluation_id)
        .bind(user.id())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Insert or refresh a job posting, keyed by fingerprint.
pub async fn upsert_job(pool: &PgPool, job: &Job) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO jobs (fingerprint, title, company, location, remote_mode, seniority,
                          salary_min, salary_max, salary_currency, description, source,
                          apply_url, posted_at, scraped_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (fingerprint) DO UPDATE
        SET title = EXCLUDED.title,
            company = EXCLUDED.company,
            location = EXCLUDED.location,
            remote_mode = EXCLUDED.remote_mode,
            seniority = EXCLUDED.seniority,
            salary_min = EXCLUDED.salary_min,
            salary_max = EXCLUDED.salary_max,
            salary_currency = EXCLUDED.salary_currency,
            description = EXCLUDED.description,
            source = EXCLUDED.source,
            apply_url = EXCLUDED.apply_url,
            posted_at = EXCLUDED.posted_at,
            scraped_at = EXCLUDED.scraped_at
        "#,
    )
    .bind(&job.fingerprint)
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.remote_mode.map(|mode| mode.to_string()))
    .bind(&job.seniority)
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(&job.salary_currency)
    .bind(&job.description)
    .bind(&job.source)
    .bind(&job.apply_url)
    .bind(job.posted_at)
    .bind(job.scraped_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record a scored evaluation. Fails with `Conflict` if the user already has
/// one for this job.
pub async fn insert_evaluation(pool: &PgPool, evaluation: &Evaluation) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        INSERT INTO evaluations (id, user_id, job_fingerprint, score_total, score_breakdown,
                                 status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, job_fingerprint) DO NOTHING
        "#,
    )
    .bind(evaluation.id)
    .bind(evaluation.user_id)
    .bind(&evaluation.job_fingerprint)
    .bind(evaluation.score_total)
    .bind(Json(&evaluation.breakdown))
    .bind(evaluation.status.as_str())
    .bind(evaluation.created_at)
    .bind(evaluation.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!(
            "evaluation for user {} and job {} already exists",
            evaluation.user_id, evaluation.job_fingerprint
        )));
    }
    Ok(())
}
