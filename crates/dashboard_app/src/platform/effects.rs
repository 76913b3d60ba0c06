use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dashboard_core::{Effect, Msg, ProfileLocator, RunFailure, RunId};
use dashboard_engine::{EngineConfig, EngineEvent, EngineHandle, FetchError};
use dashboard_logging::{dash_error, dash_info, dash_warn};

pub struct EffectRunner {
    engine: EngineHandle,
    profile: ProfileLocator,
    /// Most recently started run; 0 before the first one.
    last_run: Arc<AtomicU64>,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        profile: ProfileLocator,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, FetchError> {
        let engine = EngineHandle::new(config)?;
        Ok(Self::with_engine(engine, profile, msg_tx))
    }

    /// The forwarding thread owns `msg_tx`; once the engine is gone the
    /// sender is dropped and the receiving side sees a closed channel.
    pub fn with_engine(
        engine: EngineHandle,
        profile: ProfileLocator,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let runner = Self {
            engine,
            profile,
            last_run: Arc::new(AtomicU64::new(0)),
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun { run_id, trigger } => {
                    dash_info!(
                        "StartRun run_id={} trigger={:?} profile={}",
                        run_id,
                        trigger,
                        self.profile
                    );
                    self.last_run.store(run_id, Ordering::Relaxed);
                    self.engine.start_run(run_id, self.profile.clone());
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        let last_run = Arc::clone(&self.last_run);
        thread::spawn(move || loop {
            match engine.try_recv() {
                Ok(event) => {
                    if msg_tx.send(map_event(event)).is_err() {
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => thread::sleep(Duration::from_millis(20)),
                Err(mpsc::TryRecvError::Disconnected) => {
                    dash_error!("Engine stopped unexpectedly");
                    if let Some(msg) = engine_stopped(last_run.load(Ordering::Relaxed)) {
                        let _ = msg_tx.send(msg);
                    }
                    break;
                }
            }
        });
    }
}

/// Settles the run that was in flight when the engine died.
fn engine_stopped(run_id: RunId) -> Option<Msg> {
    (run_id != 0).then(|| Msg::RunCompleted {
        run_id,
        outcome: Err(RunFailure {
            detail: "engine stopped".to_string(),
        }),
    })
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => Msg::RunProgress {
            run_id: progress.run_id,
            lists_discovered: progress.lists_discovered,
            lists_fetched: progress.lists_fetched,
        },
        EngineEvent::RunCompleted { run_id, result } => Msg::RunCompleted {
            run_id,
            outcome: result.map_err(|err| {
                dash_warn!("Run {} failed: {}", run_id, err);
                RunFailure {
                    detail: err.to_string(),
                }
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{map_event, EffectRunner};
    use dashboard_core::{
        update, AppState, Effect, ListReference, MovieRecord, Msg, ProfileLocator, RunFailure,
        RunPhase, Trigger,
    };
    use dashboard_engine::{
        EngineEvent, EngineHandle, MovieSource, PipelineProgress, RunError, SourceError, Stage,
    };
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    struct CrashingSource;

    #[async_trait::async_trait]
    impl MovieSource for CrashingSource {
        async fn discover_lists(
            &self,
            _profile: &ProfileLocator,
        ) -> Result<Vec<ListReference>, SourceError> {
            panic!("source crashed");
        }

        async fn fetch_list(
            &self,
            _list: &ListReference,
        ) -> Result<Vec<MovieRecord>, SourceError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn progress_maps_to_run_progress() {
        let msg = map_event(EngineEvent::Progress(PipelineProgress {
            run_id: 2,
            stage: Stage::FetchingLists,
            lists_discovered: Some(4),
            lists_fetched: 1,
        }));
        assert_eq!(
            msg,
            Msg::RunProgress {
                run_id: 2,
                lists_discovered: Some(4),
                lists_fetched: 1
            }
        );
    }

    #[test]
    fn failed_run_keeps_detail_for_diagnostics() {
        let msg = map_event(EngineEvent::RunCompleted {
            run_id: 3,
            result: Err(RunError::Engine("runtime unavailable".into())),
        });
        assert_eq!(
            msg,
            Msg::RunCompleted {
                run_id: 3,
                outcome: Err(RunFailure {
                    detail: "engine unavailable: runtime unavailable".into()
                })
            }
        );
    }

    #[test]
    fn engine_crash_settles_the_run_and_closes_the_channel() {
        let (msg_tx, msg_rx) = mpsc::channel();
        let engine = EngineHandle::with_source(Arc::new(CrashingSource), 1);
        let runner =
            EffectRunner::with_engine(engine, ProfileLocator::parse("ur1").unwrap(), msg_tx);

        let (state, effects) = update(AppState::new(), Msg::LoadTriggered(Trigger::Mount));
        runner.enqueue(effects.clone());
        let Some(Effect::StartRun { run_id, .. }) = effects.first().cloned() else {
            panic!("mount should start a run");
        };

        let mut state = state;
        loop {
            let msg = msg_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("engine crash is reported");
            let settles = matches!(msg, Msg::RunCompleted { .. });
            state = update(state, msg).0;
            if settles {
                break;
            }
        }

        assert_eq!(state.phase(), RunPhase::Errored);
        assert_eq!(state.active_run(), Some(run_id));
        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }
}
