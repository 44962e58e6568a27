//! Tracing configuration and log routing.
//!
//! Every binary logs to stdout with a compact formatter filtered by `RUST_LOG` (default `info`).
//! Warnings and errors are additionally appended to a file: `DOCSEARCH_LOG_FILE` when set,
//! otherwise `tmp/<name>.log`. The file layer uses a non-blocking writer whose guard lives for
//! the rest of the process.
use std::{fs, io, path::PathBuf, sync::OnceLock};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "tmp";
const LOG_FILE_ENV: &str = "DOCSEARCH_LOG_FILE";

/// Install the global subscriber: stdout for everything, a file for warnings and above.
///
/// `name` picks the default file (`tmp/<name>.log`) so each binary keeps its own log.
pub fn init_tracing(name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(filter);

    let file = match open_log_writer(name) {
        Ok(writer) => Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact()
                .with_filter(LevelFilter::WARN),
        ),
        Err(err) => {
            eprintln!("File logging disabled: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
}

fn log_path(name: &str) -> io::Result<PathBuf> {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    fs::create_dir_all(DEFAULT_LOG_DIR)?;
    Ok(PathBuf::from(DEFAULT_LOG_DIR).join(format!("{name}.log")))
}

fn open_log_writer(name: &str) -> io::Result<NonBlocking> {
    let path = log_path(name)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
