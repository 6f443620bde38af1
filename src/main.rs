//! Binary entry point: set up logging, resolve the storage backend, load the
//! four collections and drive the Ratatui event loop until the user exits.
use std::rc::Rc;

use league_manager::config::default_data_dir;
use league_manager::logging::init_tracing;
use league_manager::{run_app, App, AppConfig, LeagueStores, MemoryStorage, SharedStorage};
use tracing::{error, info, warn};

/// Returning a `Result` bubbles fatal start-up problems (no home directory,
/// unwritable log file, broken terminal) to the shell.
fn main() -> anyhow::Result<()> {
    let log_path = init_tracing(&default_data_dir()?)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting league manager");

    let config = AppConfig::load()?;
    let storage: SharedStorage = match config.open_storage() {
        Ok(storage) => storage,
        Err(err) => {
            warn!(
                error = ?err,
                "storage unavailable; this session will not be saved"
            );
            Rc::new(MemoryStorage::new())
        }
    };

    let mut app = App::new(LeagueStores::open(storage));
    let result = run_app(&mut app);
    if let Err(err) = &result {
        error!(error = ?err, "terminal session failed");
        eprintln!("league-manager failed; details in {}", log_path.display());
    }
    result
}
