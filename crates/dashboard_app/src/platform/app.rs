use std::sync::mpsc;

use anyhow::Context;
use chrono::Utc;
use dashboard_core::{update, AppState, Msg, ProfileLocator, RunPhase, Trigger};
use dashboard_logging::dash_info;

use super::cli::Cli;
use super::config::DashboardConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui;

/// Loads the dashboard once (mount trigger) and prints it when the run
/// settles. Returns the phase the run ended in.
pub fn run_app(cli: Cli) -> anyhow::Result<RunPhase> {
    let (config, read_from) = DashboardConfig::load(cli.config.as_deref())?;
    let config = config.with_overrides(&cli)?;
    if cli.print_config {
        println!("{}", config.to_ron()?);
        return Ok(RunPhase::Ready);
    }
    logging::initialize(config.log);
    match &read_from {
        Some(path) => dash_info!("Loaded config from {}", path.display()),
        None => dash_info!("No config file, using defaults"),
    }

    let profile = ProfileLocator::parse(&config.profile)
        .with_context(|| format!("invalid profile {:?}", config.profile))?;
    dash_info!("Dashboard starting for profile {}", profile);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let _ = msg_tx.send(Msg::LoadTriggered(Trigger::Mount));
    // The runner holds the only sender from here on.
    let runner = EffectRunner::new(config.engine_config(), profile, msg_tx)
        .context("building the http client")?;

    let mut state = AppState::new();

    loop {
        let msg = msg_rx
            .recv()
            .context("engine stopped before the run settled")?;
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        if !state.consume_dirty() {
            continue;
        }
        let view = state.view();
        match view.phase {
            RunPhase::Idle => {}
            RunPhase::Loading => {
                if !cli.json {
                    eprintln!("{}", ui::render::render_status(&view));
                }
            }
            RunPhase::Ready | RunPhase::Errored => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&ui::json::render_json(&view))?);
                } else {
                    println!("{}", ui::render::render(&view, &Utc::now().to_rfc3339()));
                }
                return Ok(view.phase);
            }
        }
    }
}
