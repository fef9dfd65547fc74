use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::job::EvaluationStatus;

/// Named score bucket offered by the dashboard filter bar.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum ScoreRange {
    #[serde(rename = "90+")]
    #[strum(serialize = "90+")]
    NinetyPlus,
    #[serde(rename = "80-89")]
    #[strum(serialize = "80-89")]
    Eighties,
    #[serde(rename = "70-79")]
    #[strum(serialize = "70-79")]
    Seventies,
    #[serde(rename = "below70")]
    #[strum(serialize = "below70")]
    Below70,
}

impl ScoreRange {
    /// Inclusive `[min, max]` bounds on the 1-10 `score_total` scale.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            ScoreRange::NinetyPlus => (9.0, 10.0),
            ScoreRange::Eighties => (8.0, 8.99),
            ScoreRange::Seventies => (7.0, 7.99),
            ScoreRange::Below70 => (0.0, 6.99),
        }
    }
}

/// "Posted since" bucket. Resolved to a timestamp by the date post-filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Hash)]
pub enum DatePosted {
    #[serde(rename = "today")]
    #[strum(serialize = "today")]
    Today,
    #[serde(rename = "7days")]
    #[strum(serialize = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    #[strum(serialize = "30days")]
    ThirtyDays,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOption {
    #[default]
    ScoreDesc,
    DateDesc,
    DateAsc,
}

/// The user's filter selection. Every field is always populated; "no
/// restriction" is the empty set or `None`, never an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterModel {
    pub score_ranges: BTreeSet<ScoreRange>,
    pub date_posted: Option<DatePosted>,
    pub statuses: BTreeSet<EvaluationStatus>,
}

impl FilterModel {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.score_ranges.is_empty() || self.date_posted.is_some() || !self.statuses.is_empty()
    }

    pub fn with_score_ranges(mut self, ranges: impl IntoIterator<Item = ScoreRange>) -> Self {
        self.score_ranges = ranges.into_iter().collect();
        self
    }

    pub fn with_date_posted(mut self, date_posted: Option<DatePosted>) -> Self {
        self.date_posted = date_posted;
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = EvaluationStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }
}
