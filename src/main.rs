//! Binary entry point: resolve the data directory, start file logging, and
//! drive the Ratatui event loop until the user quits.
use library_manager::{logging, run_app, App, Config, Library};
use tracing::info;

/// Only terminal or data-directory setup failures escape; everything that
/// happens inside the session is reported on screen.
fn main() -> anyhow::Result<()> {
    let config = Config::locate()?;
    logging::init(&config)?;
    info!(data_dir = %config.data_dir.display(), "starting session");

    let library = Library::open(&config);
    let mut app = App::new(library);
    let result = run_app(&mut app);

    info!("session ended");
    result
}
