use dashboard_core::{ListReference, MovieRecord, ProfileLocator, RunId};
use dashboard_logging::{dash_info, dash_warn};
use futures_util::{stream, StreamExt};

use crate::discovery::dedupe_references;
use crate::{EngineEvent, MovieSource, PipelineProgress, RunError, SourceError, Stage};

/// Receives engine events while a run is in progress.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Outcome of list discovery. A failure leaves `lists` empty and is reported
/// here instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub lists: Vec<ListReference>,
    pub failure: Option<SourceError>,
}

pub async fn discover(source: &dyn MovieSource, profile: &ProfileLocator) -> Discovery {
    match source.discover_lists(profile).await {
        Ok(lists) => {
            let lists = dedupe_references(lists);
            dash_info!("Found {} lists for {}", lists.len(), profile);
            Discovery {
                lists,
                failure: None,
            }
        }
        Err(err) => {
            dash_warn!("Error fetching lists for {}: {}", profile, err);
            Discovery {
                lists: Vec::new(),
                failure: Some(err),
            }
        }
    }
}

/// Records of one list; a failing list logs and contributes nothing.
pub async fn fetch_list_records(source: &dyn MovieSource, list: &ListReference) -> Vec<MovieRecord> {
    match source.fetch_list(list).await {
        Ok(records) => {
            dash_info!("Movies in list {}: {}", list, records.len());
            records
        }
        Err(err) => {
            dash_warn!("Error fetching movies from {}: {}", list, err);
            Vec::new()
        }
    }
}

/// Fetches every list with at most `concurrency` requests in flight and
/// merges the records in list order, independent of completion order.
/// `on_fetched` receives the number of lists merged so far.
pub async fn collect_records(
    source: &dyn MovieSource,
    lists: &[ListReference],
    concurrency: usize,
    mut on_fetched: impl FnMut(usize),
) -> Vec<MovieRecord> {
    let mut merged = Vec::new();
    let mut results = stream::iter(lists)
        .map(|list| fetch_list_records(source, list))
        .buffered(concurrency.max(1));

    let mut fetched = 0;
    while let Some(records) = results.next().await {
        fetched += 1;
        merged.extend(records);
        on_fetched(fetched);
    }
    merged
}

/// One full run: discovery, then list fetches, then the merged record set.
/// A reported discovery failure fails the run; list failures do not.
pub async fn run_pipeline(
    source: &dyn MovieSource,
    profile: &ProfileLocator,
    concurrency: usize,
    run_id: RunId,
    sink: &dyn ProgressSink,
) -> Result<Vec<MovieRecord>, RunError> {
    sink.emit(EngineEvent::Progress(PipelineProgress {
        run_id,
        stage: Stage::Discovering,
        lists_discovered: None,
        lists_fetched: 0,
    }));

    let discovery = discover(source, profile).await;
    if let Some(failure) = discovery.failure {
        return Err(RunError::Discovery(failure));
    }

    let total = discovery.lists.len();
    sink.emit(EngineEvent::Progress(PipelineProgress {
        run_id,
        stage: Stage::FetchingLists,
        lists_discovered: Some(total),
        lists_fetched: 0,
    }));

    let records = collect_records(source, &discovery.lists, concurrency, |fetched| {
        sink.emit(EngineEvent::Progress(PipelineProgress {
            run_id,
            stage: Stage::FetchingLists,
            lists_discovered: Some(total),
            lists_fetched: fetched,
        }));
    })
    .await;

    dash_info!("All movies: {} records from {} lists", records.len(), total);
    Ok(records)
}
