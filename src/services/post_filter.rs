//! In-memory stage of the match pipeline.
//!
//! `posted_at` lives on `jobs`, while the store's OR-combined predicates only
//! reach `evaluations`. The date bucket is therefore applied here, after the
//! store has already paginated. A page may come back shorter than its limit
//! while more matches exist; only [`MatchCounts`](crate::models::dashboard::MatchCounts)
//! is authoritative for how many rows match overall.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::models::filter::DatePosted;
use crate::models::job::{JobWithEvaluation, MatchKey};

/// Resolve a bucket to its "posted at or after" instant.
///
/// `today` truncates to midnight UTC; the day-count buckets subtract a plain
/// duration from `now` without truncation.
pub fn threshold(date_posted: DatePosted, now: DateTime<Utc>) -> DateTime<Utc> {
    match date_posted {
        DatePosted::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
        DatePosted::SevenDays => now - Duration::days(7),
        DatePosted::ThirtyDays => now - Duration::days(30),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatePostFilter {
    threshold: Option<DateTime<Utc>>,
}

impl DatePostFilter {
    pub fn resolve(date_posted: Option<DatePosted>, now: DateTime<Utc>) -> Self {
        Self {
            threshold: date_posted.map(|bucket| threshold(bucket, now)),
        }
    }

    pub fn threshold(&self) -> Option<DateTime<Utc>> {
        self.threshold
    }

    pub fn is_active(&self) -> bool {
        self.threshold.is_some()
    }

    /// A missing posting date never excludes a row.
    pub fn keeps(&self, posted_at: Option<DateTime<Utc>>) -> bool {
        match (self.threshold, posted_at) {
            (Some(threshold), Some(posted_at)) => posted_at >= threshold,
            _ => true,
        }
    }

    pub fn apply(&self, rows: Vec<JobWithEvaluation>) -> Vec<JobWithEvaluation> {
        if !self.is_active() {
            return rows;
        }
        rows.into_iter().filter(|row| self.keeps(row.job.posted_at)).collect()
    }

    pub fn count(&self, keys: &[MatchKey]) -> u64 {
        keys.iter().filter(|key| self.keeps(key.posted_at)).count() as u64
    }
}
