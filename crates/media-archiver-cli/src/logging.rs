use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/media-archiver.log";

/// Console output for the operator plus a plain-text log file that keeps the
/// per-file debug trail. `TRACING_LEVEL` sets the filter and `LOG_FILE_PATH`
/// the file. Keep the returned guard alive until exit so the file is flushed.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());

    let log_file = PathBuf::from(
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
    );
    let (log_dir, log_name) = split_log_path(&log_file);

    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(EnvFilter::new(filter))
        .init();

    debug!("Logging to {}", log_file.display());

    guard
}

fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("media-archiver.log"));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("./logs/run.log")),
            (PathBuf::from("./logs"), PathBuf::from("run.log"))
        );
        assert_eq!(
            split_log_path(Path::new("run.log")),
            (PathBuf::from("."), PathBuf::from("run.log"))
        );
    }
}
