//! Dashboard list state as an explicit state machine.
//!
//! The controller never talks to the store itself. [`DashboardController::dispatch`]
//! folds an [`Action`] into the state and may hand back a [`Command`]; the
//! caller runs it with [`Command::execute`] and dispatches the resulting
//! completion action. Each command carries a [`RequestId`] and only the
//! response to the currently awaited request is applied, so a superseded
//! filter change can never overwrite a newer one.

use tracing::debug;

use crate::models::dashboard::{MatchCounts, Page};
use crate::models::filter::{FilterModel, SortOption};
use crate::models::job::JobWithEvaluation;
use crate::services::auth::AuthenticatedUser;
use crate::services::dashboard::DashboardService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Waiting for rows at offset 0 plus counts under new filters or sort.
    Filtering { request: RequestId },
    /// Waiting for the next page to append.
    LoadingMore { request: RequestId },
}

/// First page and counts for the unfiltered, default-sorted view, as
/// rendered with the page. Restored without a round-trip whenever the
/// user returns to that view.
#[derive(Debug, Clone, Default)]
pub struct InitialPage {
    pub rows: Vec<JobWithEvaluation>,
    pub counts: MatchCounts,
}

impl InitialPage {
    pub async fn load(
        service: &DashboardService,
        user: Option<&AuthenticatedUser>,
        page_size: i64,
    ) -> Self {
        let filters = FilterModel::empty();
        let (rows, counts) = tokio::join!(
            service.load_page(user, Page::first(page_size), &filters, SortOption::default()),
            service.get_counts(user, &filters),
        );
        Self { rows, counts }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetFilters(FilterModel),
    SetSort(SortOption),
    ClearFilters,
    LoadMore,
    Refreshed {
        request: RequestId,
        rows: Vec<JobWithEvaluation>,
        counts: MatchCounts,
    },
    MoreLoaded {
        request: RequestId,
        rows: Vec<JobWithEvaluation>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh {
        request: RequestId,
        filters: FilterModel,
        sort: SortOption,
        page: Page,
    },
    FetchMore {
        request: RequestId,
        filters: FilterModel,
        sort: SortOption,
        page: Page,
    },
}

impl Command {
    pub fn request(&self) -> RequestId {
        match self {
            Command::Refresh { request, .. } | Command::FetchMore { request, .. } => *request,
        }
    }

    /// Run against the dashboard service and produce the completion action.
    pub async fn execute(
        self,
        service: &DashboardService,
        user: Option<&AuthenticatedUser>,
    ) -> Action {
        match self {
            Command::Refresh {
                request,
                filters,
                sort,
                page,
            } => {
                let (rows, counts) = tokio::join!(
                    service.load_page(user, page, &filters, sort),
                    service.get_counts(user, &filters),
                );
                Action::Refreshed {
                    request,
                    rows,
                    counts,
                }
            }
            Command::FetchMore {
                request,
                filters,
                sort,
                page,
            } => {
                let rows = service.load_page(user, page, &filters, sort).await;
                Action::MoreLoaded { request, rows }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardController {
    rows: Vec<JobWithEvaluation>,
    filters: FilterModel,
    sort: SortOption,
    counts: MatchCounts,
    phase: Phase,
    page_size: i64,
    /// Store offset of the next page. Advances by whole pages because the
    /// date post-filter may return fewer rows than were consumed.
    next_offset: i64,
    last_request: u64,
    initial: InitialPage,
}

impl DashboardController {
    pub fn new(initial: InitialPage, page_size: i64) -> Self {
        let mut controller = Self {
            rows: Vec::new(),
            filters: FilterModel::empty(),
            sort: SortOption::default(),
            counts: MatchCounts::default(),
            phase: Phase::Idle,
            page_size,
            next_offset: 0,
            last_request: 0,
            initial,
        };
        controller.restore_initial();
        controller
    }

    pub fn rows(&self) -> &[JobWithEvaluation] {
        &self.rows
    }

    pub fn filters(&self) -> &FilterModel {
        &self.filters
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn filtered_count(&self) -> u64 {
        self.counts.filtered_count
    }

    pub fn total_count(&self) -> u64 {
        self.counts.total_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::LoadingMore { .. })
    }

    pub fn is_filtering(&self) -> bool {
        matches!(self.phase, Phase::Filtering { .. })
    }

    pub fn has_more(&self) -> bool {
        (self.rows.len() as u64) < self.counts.filtered_count
    }

    /// The "load more" control is enabled only when idle with rows left.
    pub fn can_load_more(&self) -> bool {
        self.phase == Phase::Idle && self.has_more()
    }

    pub fn dispatch(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::SetFilters(filters) => {
                if filters == self.filters {
                    return None;
                }
                self.filters = filters;
                self.requery()
            }
            Action::SetSort(sort) => {
                if sort == self.sort {
                    return None;
                }
                self.sort = sort;
                self.requery()
            }
            Action::ClearFilters => self.dispatch(Action::SetFilters(FilterModel::empty())),
            Action::LoadMore => {
                if !self.can_load_more() {
                    return None;
                }
                let request = self.next_request();
                self.phase = Phase::LoadingMore { request };
                Some(Command::FetchMore {
                    request,
                    filters: self.filters.clone(),
                    sort: self.sort,
                    page: Page::new(self.next_offset, self.page_size),
                })
            }
            Action::Refreshed {
                request,
                rows,
                counts,
            } => {
                if self.phase != (Phase::Filtering { request }) {
                    debug!(?request, phase = ?self.phase, "Discarding stale refresh");
                    return None;
                }
                self.rows = rows;
                self.counts = counts;
                self.next_offset = self.page_size;
                self.phase = Phase::Idle;
                None
            }
            Action::MoreLoaded { request, rows } => {
                if self.phase != (Phase::LoadingMore { request }) {
                    debug!(?request, phase = ?self.phase, "Discarding stale page");
                    return None;
                }
                self.rows.extend(rows);
                self.next_offset += self.page_size;
                self.phase = Phase::Idle;
                None
            }
        }
    }

    fn requery(&mut self) -> Option<Command> {
        if !self.filters.has_active_filters() && self.sort == SortOption::default() {
            self.restore_initial();
            return None;
        }

        let request = self.next_request();
        self.phase = Phase::Filtering { request };
        Some(Command::Refresh {
            request,
            filters: self.filters.clone(),
            sort: self.sort,
            page: Page::first(self.page_size),
        })
    }

    fn restore_initial(&mut self) {
        self.rows = self.initial.rows.clone();
        self.counts = self.initial.counts;
        self.next_offset = self.page_size;
        self.phase = Phase::Idle;
    }

    fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId(self.last_request)
    }
}
