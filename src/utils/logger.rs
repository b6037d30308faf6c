use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use std::path::Path;

/// Initialize logging system
///
/// `RUST_LOG` overrides `level` when set. Fails if a subscriber is already
/// installed or the log file cannot be opened.
pub fn init_logger(level: &str, json_output: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if json_output {
        if let Some(file) = log_file {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .with_context(|| format!("Failed to open log file {}", file.display()))?;

            registry
                .with(fmt::layer().json().with_writer(file))
                .try_init()?;
        } else {
            registry
                .with(fmt::layer().json())
                .try_init()?;
        }
    } else {
        // Keep stdout clean for the report
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Initialize logger from config
pub fn init_from_config(config: &crate::utils::config::LoggingConfig) -> Result<()> {
    let json = config.output == "json";
    let log_file = if !config.file_path.is_empty() {
        Some(Path::new(&config.file_path))
    } else {
        None
    };

    init_logger(&config.level, json, log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_log_file_is_an_error() {
        let result = init_logger("info", true, Some(Path::new("/nonexistent-dir/oscillator.log")));
        assert!(result.is_err());
    }
}
