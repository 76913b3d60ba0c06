//! Dashboard engine: fetching, list discovery, record extraction and run execution.
mod decode;
mod discovery;
mod engine;
mod extract;
mod fetch;
mod pipeline;
mod source;
mod types;

pub use decode::{decode_text, DecodeError, DecodedText};
pub use discovery::{dedupe_references, scan_list_links, LIST_PATH_PATTERN};
pub use engine::{EngineConfig, EngineHandle, SourceConfig};
pub use extract::{ListerItemExtractor, RecordExtractor, RecordSelectors};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use pipeline::{
    collect_records, discover, fetch_list_records, run_pipeline, ChannelProgressSink, Discovery,
    ProgressSink,
};
pub use source::{ApiSource, MovieSource, ProxyMode, ScrapeSource, ALLORIGINS_ENDPOINT};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchOutput, PipelineProgress, RunError, SourceError,
    Stage,
};
