mod app;
mod config;
mod controls;
mod coverage;
mod debug;
mod heatmap;
mod pacer;
mod path;
mod ramp;
mod render;
mod replay;
mod session;

use anyhow::Context;

use crate::config::Config;
use crate::path::{ReplayCursor, SourceMode};

fn main() {
    env_logger::init();

    // Usage errors exit 2 before any window opens; --help/--version exit 0.
    let config = Config::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    log::info!(
        "pathheat starting: {}x{} @ {} fps, radius {}, increment {}, ceiling {:?}",
        config.width,
        config.height,
        config.target_fps,
        config.radius,
        config.increment,
        config.ceiling,
    );

    if let Err(e) = start(config) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn start(config: Config) -> anyhow::Result<()> {
    let replay = load_replay(&config)?;
    app::run(config, replay)
}

/// Load the replay file. Failure only matters when we start in replay mode;
/// otherwise the replay control is disabled for the session.
fn load_replay(config: &Config) -> anyhow::Result<Option<ReplayCursor>> {
    match replay::load_replay(&config.replay_path) {
        Ok(path) => Ok(ReplayCursor::new(path)),
        Err(e) if config.initial_mode == SourceMode::Replay => {
            Err(e).context("cannot start in replay mode")
        }
        Err(e) => {
            log::error!("{e}; replay disabled");
            Ok(None)
        }
    }
}
