use std::str::FromStr;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::filter::{DatePosted, FilterModel, ScoreRange, SortOption};
use crate::models::job::{EvaluationStatus, JobWithEvaluation};

/// Upper bound on rows per request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Offset/limit window over an ordered match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Page {
    #[garde(range(min = 0))]
    pub offset: i64,

    #[garde(range(min = 1, max = MAX_PAGE_SIZE))]
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: i64) -> Self {
        Self { offset: 0, limit }
    }
}

/// Filtered and baseline match counts for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub filtered_count: u64,
    /// Everything except hidden, regardless of the active filters.
    pub total_count: u64,
}

/// Query string accepted by the match list and count endpoints.
///
/// List-valued dimensions are comma separated, e.g. `scores=90%2B,80-89`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchQueryParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub scores: Option<String>,
    pub date: Option<String>,
    pub statuses: Option<String>,
    pub sort: Option<String>,
}

impl MatchQueryParams {
    pub fn filters(&self) -> Result<FilterModel, FilterParseError> {
        let score_ranges = parse_list::<ScoreRange>("scores", self.scores.as_deref())?;
        let statuses = parse_list::<EvaluationStatus>("statuses", self.statuses.as_deref())?;
        let date_posted = match non_blank(self.date.as_deref()) {
            Some(raw) => Some(parse_token::<DatePosted>("date", raw)?),
            None => None,
        };

        Ok(FilterModel::empty()
            .with_score_ranges(score_ranges)
            .with_date_posted(date_posted)
            .with_statuses(statuses))
    }

    pub fn sort(&self) -> Result<SortOption, FilterParseError> {
        match non_blank(self.sort.as_deref()) {
            Some(raw) => parse_token("sort", raw),
            None => Ok(SortOption::default()),
        }
    }

    pub fn page(&self, default_limit: i64) -> Page {
        Page::new(self.offset.unwrap_or(0), self.limit.unwrap_or(default_limit))
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_token<T: FromStr>(param: &'static str, raw: &str) -> Result<T, FilterParseError> {
    raw.trim().parse().map_err(|_| FilterParseError::UnknownValue {
        param,
        value: raw.trim().to_string(),
    })
}

fn parse_list<T: FromStr>(param: &'static str, raw: Option<&str>) -> Result<Vec<T>, FilterParseError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|token| !token.trim().is_empty())
        .map(|token| parse_token(param, token))
        .collect()
}

/// Body of `PUT /api/v1/matches/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: EvaluationStatus,
}

#[derive(Debug, Serialize)]
pub struct MatchPageResponse {
    pub offset: i64,
    pub limit: i64,
    pub matches: Vec<JobWithEvaluation>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterParseError {
    #[error("Unknown value '{value}' for '{param}'")]
    UnknownValue { param: &'static str, value: String },
}
