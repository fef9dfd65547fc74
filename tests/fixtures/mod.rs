//! Seed data for dashboard tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use job_match::db::InMemoryMatchStore;
use job_match::models::job::{
    Evaluation, EvaluationStatus, Job, RemoteMode, ScoreBreakdown, ScoreComponent,
};
use job_match::services::auth::AuthenticatedUser;
use uuid::Uuid;

pub fn job(fingerprint: &str, posted_at: Option<DateTime<Utc>>) -> Job {
    Job {
        fingerprint: fingerprint.to_string(),
        title: "Senior Rust Engineer".to_string(),
        company: "Ferrous Systems".to_string(),
        location: Some("Berlin".to_string()),
        remote_mode: Some(RemoteMode::Hybrid),
        seniority: Some("senior".to_string()),
        salary_min: Some(80_000),
        salary_max: Some(110_000),
        salary_currency: Some("EUR".to_string()),
        description: Some("Build storage engines.".to_string()),
        source: "linkedin".to_string(),
        apply_url: Some(format!("https://jobs.example.com/{fingerprint}")),
        posted_at,
        scraped_at: Utc::now(),
    }
}

pub fn evaluation(
    user: &AuthenticatedUser,
    fingerprint: &str,
    score_total: f64,
    status: EvaluationStatus,
) -> Evaluation {
    let now = Utc::now();
    let component = |score: f64| ScoreComponent {
        score,
        rationale: "Seeded for tests".to_string(),
    };
    Evaluation {
        id: Uuid::new_v4(),
        user_id: user.id(),
        job_fingerprint: fingerprint.to_string(),
        score_total,
        breakdown: ScoreBreakdown {
            skills: component(score_total),
            experience: component(score_total),
            location: component(score_total),
            compensation: component(score_total),
            career_goals: component(score_total),
        },
        status,
        created_at: now,
        updated_at: now,
    }
}

/// A fresh user identity.
pub fn user() -> AuthenticatedUser {
    AuthenticatedUser::new(Uuid::new_v4())
}

/// Store one job and the user's evaluation of it. Returns the evaluation id.
pub async fn seed_match(
    store: &InMemoryMatchStore,
    user: &AuthenticatedUser,
    score_total: f64,
    status: EvaluationStatus,
    posted_at: Option<DateTime<Utc>>,
) -> Uuid {
    let fingerprint = Uuid::new_v4().to_string();
    store.upsert_job(job(&fingerprint, posted_at)).await;
    let evaluation = evaluation(user, &fingerprint, score_total, status);
    let id = evaluation.id;
    store
        .insert_evaluation(evaluation)
        .await
        .expect("seeded evaluation should be unique");
    id
}

/// A spread of scores, statuses and posting dates, ties included.
pub async fn seed_mixed(store: &InMemoryMatchStore, user: &AuthenticatedUser) {
    let now = Utc::now();
    let statuses = [
        EvaluationStatus::New,
        EvaluationStatus::Viewed,
        EvaluationStatus::Saved,
        EvaluationStatus::Applied,
        EvaluationStatus::Hidden,
    ];
    let scores = [9.8, 9.0, 8.99, 8.5, 8.5, 8.0, 7.99, 7.5, 7.0, 6.99, 5.2, 3.1];

    for (i, score) in scores.iter().enumerate() {
        let posted_at = match i % 4 {
            0 => Some(now - Duration::hours(1)),
            1 => Some(now - Duration::days(3)),
            2 => Some(now - Duration::days(20)),
            _ => None,
        };
        seed_match(store, user, *score, statuses[i % statuses.len()], posted_at).await;
    }
}
