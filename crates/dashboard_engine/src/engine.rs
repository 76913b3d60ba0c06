use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use dashboard_core::{ProfileLocator, RunId};
use dashboard_logging::{dash_error, dash_info, RunScope};

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::pipeline::{run_pipeline, ChannelProgressSink};
use crate::{
    ApiSource, EngineEvent, FetchError, MovieSource, ProxyMode, RunError, ScrapeSource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Scrape HTML pages, optionally through a proxy.
    Scrape { proxy: ProxyMode },
    /// Use the JSON backend rooted at `base_url`.
    Api { base_url: String },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Scrape {
            proxy: ProxyMode::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub source: SourceConfig,
    pub fetch: FetchSettings,
    /// Lists fetched at once; 1 fetches strictly one after another.
    pub concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            fetch: FetchSettings::default(),
            concurrency: 1,
        }
    }
}

impl EngineConfig {
    pub fn build_source(&self) -> Result<Arc<dyn MovieSource>, FetchError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(self.fetch.clone())?);
        Ok(match &self.source {
            SourceConfig::Scrape { proxy } => Arc::new(ScrapeSource::new(fetcher, proxy.clone())),
            SourceConfig::Api { base_url } => Arc::new(ApiSource::new(fetcher, base_url.clone())),
        })
    }
}

enum EngineCommand {
    Run {
        run_id: RunId,
        profile: ProfileLocator,
    },
}

/// Executes runs on a dedicated thread, one at a time. Run requests that
/// are already superseded by a newer request when dequeued are skipped.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        Ok(Self::with_source(config.build_source()?, config.concurrency))
    }

    pub fn with_source(source: Arc<dyn MovieSource>, concurrency: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => Some(runtime),
                Err(err) => {
                    dash_error!("Failed to start engine runtime: {}", err);
                    None
                }
            };

            while let Ok(command) = cmd_rx.recv() {
                let EngineCommand::Run { run_id, profile } = latest_command(command, &cmd_rx);
                let _scope = RunScope::enter(run_id);
                let result = match runtime.as_ref() {
                    Some(runtime) => {
                        dash_info!("Starting run for {}", profile);
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        runtime.block_on(run_pipeline(
                            source.as_ref(),
                            &profile,
                            concurrency,
                            run_id,
                            &sink,
                        ))
                    }
                    None => Err(RunError::Engine("runtime unavailable".into())),
                };
                if event_tx
                    .send(EngineEvent::RunCompleted { run_id, result })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn start_run(&self, run_id: RunId, profile: ProfileLocator) {
        let _ = self.cmd_tx.send(EngineCommand::Run { run_id, profile });
    }

    /// `Disconnected` means the worker thread has stopped and no further
    /// events will arrive.
    pub fn try_recv(&self) -> Result<EngineEvent, mpsc::TryRecvError> {
        match self.event_rx.lock() {
            Ok(rx) => rx.try_recv(),
            Err(_) => Err(mpsc::TryRecvError::Disconnected),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn latest_command(
    mut command: EngineCommand,
    cmd_rx: &mpsc::Receiver<EngineCommand>,
) -> EngineCommand {
    while let Ok(newer) = cmd_rx.try_recv() {
        let EngineCommand::Run { run_id, .. } = &command;
        dash_info!("Skipping run {} superseded before it started", run_id);
        command = newer;
    }
    command
}
