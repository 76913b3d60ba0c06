use crate::aggregate::{aggregate, Aggregates};
use crate::view_model::{AppViewModel, MovieRowView, SummaryView};
use crate::{MovieRecord, RunFailure};

pub type RunId = u64;

/// Fixed user-facing message for a failed run.
pub const FAILED_RUN_MESSAGE: &str = "Failed to fetch movies. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunProgress {
    pub lists_discovered: Option<usize>,
    pub lists_fetched: usize,
}

/// State of one dashboard session. Only the most recently triggered run may
/// change it; results of superseded runs are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: RunPhase,
    last_run_id: RunId,
    active_run: Option<RunId>,
    progress: RunProgress,
    records: Vec<MovieRecord>,
    aggregates: Aggregates,
    error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active_run
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            run_id: self.active_run,
            loading: self.phase == RunPhase::Loading,
            error: self.error.clone(),
            progress: self.progress,
            summary: SummaryView {
                total: self.aggregates.total,
                average_rating: self.aggregates.average_rating,
                movies_per_week: self.aggregates.movies_per_week,
                movies_per_month: self.aggregates.movies_per_month,
            },
            genres: self.aggregates.genres.clone(),
            years: self.aggregates.years.clone(),
            ratings: self.aggregates.ratings.clone(),
            rows: self
                .records
                .iter()
                .map(|record| MovieRowView {
                    title: record.title().to_string(),
                    year: record.year().to_string(),
                    rating: record.rating().to_string(),
                    genre: record.genre().to_string(),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Enters `Loading` under a fresh run id, discarding everything the
    /// previous run produced.
    pub(crate) fn begin_run(&mut self) -> RunId {
        self.last_run_id += 1;
        let run_id = self.last_run_id;
        self.phase = RunPhase::Loading;
        self.active_run = Some(run_id);
        self.progress = RunProgress::default();
        self.records = Vec::new();
        self.aggregates = Aggregates::default();
        self.error = None;
        self.dirty = true;
        run_id
    }

    pub(crate) fn apply_progress(&mut self, run_id: RunId, progress: RunProgress) {
        if !self.is_current_loading_run(run_id) {
            return;
        }
        if self.progress != progress {
            self.progress = progress;
            self.dirty = true;
        }
    }

    pub(crate) fn complete_run(
        &mut self,
        run_id: RunId,
        outcome: Result<Vec<MovieRecord>, RunFailure>,
    ) {
        if !self.is_current_loading_run(run_id) {
            return;
        }
        match outcome {
            Ok(records) => {
                self.aggregates = aggregate(&records);
                self.records = records;
                self.phase = RunPhase::Ready;
            }
            Err(_) => {
                self.records = Vec::new();
                self.aggregates = Aggregates::default();
                self.error = Some(FAILED_RUN_MESSAGE.to_string());
                self.phase = RunPhase::Errored;
            }
        }
        self.dirty = true;
    }

    fn is_current_loading_run(&self, run_id: RunId) -> bool {
        self.phase == RunPhase::Loading && self.active_run == Some(run_id)
    }
}
