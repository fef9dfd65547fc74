use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::filter::{FilterModel, SortOption};
use crate::models::job::{Evaluation, EvaluationStatus};
use crate::services::auth::AuthenticatedUser;
use crate::services::post_filter::DatePostFilter;

/// Which statuses a query admits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRule {
    /// Default when no status is selected: everything but `hidden`.
    ExcludeHidden,
    /// Exactly the selected statuses, `hidden` included if chosen.
    Include(BTreeSet<EvaluationStatus>),
}

impl StatusRule {
    pub fn admits(&self, status: EvaluationStatus) -> bool {
        match self {
            StatusRule::ExcludeHidden => status != EvaluationStatus::Hidden,
            StatusRule::Include(statuses) => statuses.contains(&status),
        }
    }
}

/// Inclusive score interval on the 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBound {
    pub min: f64,
    pub max: f64,
}

impl ScoreBound {
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}

/// Store-side query over one user's evaluations.
///
/// Fields are private and the only constructors take an
/// [`AuthenticatedUser`], so an unscoped query cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationQuery {
    owner: Uuid,
    status: StatusRule,
    score_bounds: Vec<ScoreBound>,
    sort: SortOption,
}

impl EvaluationQuery {
    /// The default restriction alone; the baseline for `total_count`.
    pub fn baseline(user: &AuthenticatedUser) -> Self {
        Self {
            owner: user.id(),
            status: StatusRule::ExcludeHidden,
            score_bounds: Vec::new(),
            sort: SortOption::default(),
        }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn status_rule(&self) -> &StatusRule {
        &self.status
    }

    /// OR-combined; empty means any score.
    pub fn score_bounds(&self) -> &[ScoreBound] {
        &self.score_bounds
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    /// Evaluate every store-side predicate against one evaluation.
    pub fn matches(&self, evaluation: &Evaluation) -> bool {
        evaluation.user_id == self.owner
            && self.status.admits(evaluation.status)
            && (self.score_bounds.is_empty()
                || self
                    .score_bounds
                    .iter()
                    .any(|bound| bound.contains(evaluation.score_total)))
    }
}

/// Two-stage plan for one dashboard request: what the store executes, then
/// what is narrowed in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPipeline {
    pub store_query: EvaluationQuery,
    pub post_filter: DatePostFilter,
}

/// Translate the active filter selection into a match pipeline.
pub fn compose(
    user: &AuthenticatedUser,
    filters: &FilterModel,
    sort: SortOption,
    now: DateTime<Utc>,
) -> MatchPipeline {
    let status = if filters.statuses.is_empty() {
        StatusRule::ExcludeHidden
    } else {
        StatusRule::Include(filters.statuses.clone())
    };

    let score_bounds = filters
        .score_ranges
        .iter()
        .map(|range| {
            let (min, max) = range.bounds();
            ScoreBound { min, max }
        })
        .collect();

    MatchPipeline {
        store_query: EvaluationQuery {
            owner: user.id(),
            status,
            score_bounds,
            sort,
        },
        post_filter: DatePostFilter::resolve(filters.date_posted, now),
    }
}
