use crate::{AppState, Effect, Msg, RunProgress};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LoadTriggered(trigger) => {
            // A new trigger always restarts; an in-flight run is superseded.
            let run_id = state.begin_run();
            vec![Effect::StartRun { run_id, trigger }]
        }
        Msg::RunProgress {
            run_id,
            lists_discovered,
            lists_fetched,
        } => {
            state.apply_progress(
                run_id,
                RunProgress {
                    lists_discovered,
                    lists_fetched,
                },
            );
            Vec::new()
        }
        Msg::RunCompleted { run_id, outcome } => {
            state.complete_run(run_id, outcome);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
