use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Work arrangement advertised by a posting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemoteMode {
    Remote,
    Hybrid,
    Onsite,
}

/// A scraped job posting. Written by the ingestion process, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Content-derived dedup key, stable across scrape cycles.
    pub fingerprint: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub remote_mode: Option<RemoteMode>,
    pub seniority: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: Option<String>,
    pub description: Option<String>,
    pub source: String,
    pub apply_url: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
}

/// Lifecycle of one user's evaluation. Only the user mutates it after scoring.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvaluationStatus {
    New,
    Viewed,
    Saved,
    Applied,
    Hidden,
}

impl EvaluationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::New => "new",
            EvaluationStatus::Viewed => "viewed",
            EvaluationStatus::Saved => "saved",
            EvaluationStatus::Applied => "applied",
            EvaluationStatus::Hidden => "hidden",
        }
    }
}

/// One scored dimension of a match, with the model's reasoning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ScoreComponent {
    pub score: f64,
    pub rationale: String,
}

/// The five sub-scores behind `score_total`. Missing dimensions decode as
/// zero, so the column default `{}` is a valid breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ScoreBreakdown {
    pub skills: ScoreComponent,
    pub experience: ScoreComponent,
    pub location: ScoreComponent,
    pub compensation: ScoreComponent,
    pub career_goals: ScoreComponent,
}

/// A user's AI-computed match against one job. At most one per (user, fingerprint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_fingerprint: String,
    /// Continuous 1-10 scale.
    pub score_total: f64,
    pub breakdown: ScoreBreakdown,
    pub status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Score as the rounded 0-100 percentage shown on match cards.
    pub fn match_percent(&self) -> u8 {
        (self.score_total * 10.0).round().clamp(0.0, 100.0) as u8
    }
}

/// An evaluation joined to the job it scores; the unit the dashboard renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobWithEvaluation {
    pub evaluation: Evaluation,
    pub job: Job,
}

/// Minimal projection used to count matches once the date post-filter has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchKey {
    pub evaluation_id: Uuid,
    pub score_total: f64,
    pub posted_at: Option<DateTime<Utc>>,
}
