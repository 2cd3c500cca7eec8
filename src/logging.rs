//! File logging. The terminal is owned by the UI, so records go to a file or nowhere.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// Route `log` records to `path`. `RUST_LOG`, when set, overrides `level`.
pub fn init(path: &Path, level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;
    log::info!("logging to {}", path.display());
    Ok(())
}
