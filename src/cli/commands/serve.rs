use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::server::{self, AppState};
use tracing::warn;

/// Handle the `serve` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Serve { bind } = cmd else {
        return Ok(());
    };

    let mut cfg = cfg.clone();
    if let Some(addr) = bind {
        cfg.bind = addr.clone();
    }

    server::init_tracing();

    // refuse to start before any socket is opened
    let state = AppState::new(cfg.clone())?;

    if cfg.hashed_password.is_none() {
        warn!("HASHED_PASSWORD is not configured; every login will fail with a server error");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::start_server(state, &cfg.bind))
}
