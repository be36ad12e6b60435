use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Route `tracing` output to `library.log` in the data directory. Writing to
/// stdout would scribble over the alternate screen, so the file is the only
/// sink. The filter is fixed at `info`.
pub fn init(config: &Config) -> Result<()> {
    fs::create_dir_all(config.data_dir()).context("failed to create data directory")?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .context("failed to open log file")?;

    let filter = EnvFilter::default().add_directive(tracing::Level::INFO.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install log subscriber")
}
