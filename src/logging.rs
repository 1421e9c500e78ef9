use anyhow::{Context, Result};
use log::LevelFilter;
use std::{fs::OpenOptions, path::Path};

/// Sends log records to a file. The terminal belongs to the frame display,
/// so nothing is ever written to stdout or stderr. Without a path, logging
/// stays off.
pub(crate) fn init(path: Option<&Path>, level: LevelFilter) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already installed")?;
    Ok(())
}
