use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::UtcOffset;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, EnvFilter, fmt, prelude::*};

const LOG_RETENTION_DAYS: u64 = 7;
const SESSION_PREFIX: &str = "session-";

/// Log directory under the user cache directory
/// - Linux: ~/.cache/jsinsight/
/// - macOS: ~/Library/Caches/jsinsight/
/// - Windows: %LOCALAPPDATA%\jsinsight\
pub fn log_dir() -> io::Result<PathBuf> {
    let mut dir = dirs::cache_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Unable to determine user cache directory"))?;
    dir.push("jsinsight");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Removes session logs older than LOG_RETENTION_DAYS
pub fn cleanup_old_logs(dir: &Path) -> io::Result<usize> {
    let now = std::time::SystemTime::now();
    let retention = std::time::Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);
    let mut removed = 0;

    for entry in fs::read_dir(dir)?.flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let is_session_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(SESSION_PREFIX) && name.ends_with(".log"));
        if !is_session_log {
            continue;
        }
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e),
            }
        }
    }
    Ok(removed)
}

/// Initialize logger with stderr and optional file output
/// Returns a WorkerGuard that must be kept alive for the duration of the program
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `enable_file_logging` - Also write a DEBUG-level session log to the cache directory
pub fn init_logger(no_color: bool, log_level: Option<&str>, enable_file_logging: bool) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    if !enable_file_logging {
        let (_, guard) = tracing_appender::non_blocking(std::io::sink());
        let result = tracing_subscriber::registry().with(stderr_layer).try_init();
        return finish_init(result, guard);
    }

    let dir = log_dir()?;
    cleanup_old_logs(&dir)?;

    let timestamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let log_path = dir.join(format!("{}{}-{}.log", SESSION_PREFIX, timestamp, std::process::id()));

    let file = fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let result = tracing_subscriber::registry().with(stderr_layer).with(file_layer).try_init();
    eprintln!("Logging to file: {:?}", log_path);
    finish_init(result, guard)
}

/// A subscriber installed earlier (tests, embedding hosts) is not an error.
fn finish_init(
    result: Result<(), tracing_subscriber::util::TryInitError>,
    guard: WorkerGuard,
) -> io::Result<WorkerGuard> {
    match result {
        Ok(()) => Ok(guard),
        Err(e) if e.to_string().contains("already been set") || e.to_string().contains("SetLoggerError") => {
            Ok(guard)
        }
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}
