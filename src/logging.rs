use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive for the rest of the process.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

fn level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

fn filter(debug: bool) -> EnvFilter {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(debug)))
    } else {
        EnvFilter::new(level(debug))
    }
}

/// Initialise logging. `debug` selects the `debug` level (overridable via
/// `RUST_LOG`), otherwise `info` is used. When `file` is given, output is
/// appended to it through a non-blocking writer instead of going to stdout.
pub fn init(debug: bool, file: Option<PathBuf>) {
    if let Some(path) = file {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(handle) => {
                let (writer, guard) = tracing_appender::non_blocking(handle);
                let installed = tracing_subscriber::fmt()
                    .with_env_filter(filter(debug))
                    .with_writer(writer)
                    .with_ansi(false)
                    .try_init()
                    .is_ok();
                if installed {
                    let _ = FILE_GUARD.set(guard);
                }
                return;
            }
            Err(err) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter(debug))
                    .try_init();
                tracing::warn!(path = %path.display(), error = %err, "unable to open log file; logging to stdout");
                return;
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .try_init();
}
