use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub use tracing::{debug, error, info, warn};

const LEVEL_ENV: &str = "RSVP_SEED_LOG";

/// Level filter from `RSVP_SEED_LOG`; unknown or missing values mean `info`.
fn filter_from_env() -> EnvFilter {
    let level = std::env::var(LEVEL_ENV).unwrap_or_default().to_lowercase();
    EnvFilter::new(level_directive(&level))
}

fn level_directive(level: &str) -> &'static str {
    match level {
        "error" => "error",
        "warn" | "warning" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

/// Send tracing output to `log_path`, appending. Stdout stays free for the report.
pub fn init(log_path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = log_path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if installed.is_ok() {
        info!(path = %path.display(), "logging initialized");
    }
    Ok(path.to_path_buf())
}
