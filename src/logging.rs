use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::info;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Env var holding an `EnvFilter` directive, e.g. `BINSORT_LOG=binsort=debug`
pub const LOG_ENV: &str = "BINSORT_LOG";

/// Install the global subscriber, appending to `log_path`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or stderr.
/// Without a usable path logging stays off. Safe to call more than once.
pub fn init(log_path: Option<&Path>) {
    INIT_TRACING.call_once(|| {
        let Some(path) = log_path else {
            return;
        };

        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => file,
            Err(_) => return,
        };

        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();

        info!(path = %path.display(), "binsort tracing initialized");
    });
}
