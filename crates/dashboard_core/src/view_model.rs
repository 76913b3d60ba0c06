use crate::{AggregateBucket, RunId, RunPhase, RunProgress};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SummaryView {
    pub total: usize,
    pub average_rating: f64,
    pub movies_per_week: f64,
    pub movies_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: RunPhase,
    pub run_id: Option<RunId>,
    pub loading: bool,
    pub error: Option<String>,
    pub progress: RunProgress,
    pub summary: SummaryView,
    pub genres: Vec<AggregateBucket>,
    pub years: Vec<AggregateBucket>,
    pub ratings: Vec<AggregateBucket>,
    pub rows: Vec<MovieRowView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRowView {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub genre: String,
}
