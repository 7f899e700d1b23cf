use bdixdir_base::{err, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BDIXDIR_LOG";

/// Installs the global tracing subscriber.
///
/// The filter comes from `BDIXDIR_LOG`, then `RUST_LOG`, then `verbosity`
/// (0 = warn, 1 = info, 2 = debug, more = trace). When `log_file` is given
/// output is appended there instead of stderr, which is what the terminal
/// UI needs.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            let level = match verbosity {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(level)
        });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            subscriber
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .map_err(|e| err(e.to_string()))?;
        }
        None => {
            subscriber
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| err(e.to_string()))?;
        }
    }

    tracing::info!(target: "bdixdir", verbosity, "logging initialized");
    Ok(())
}
