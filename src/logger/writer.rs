//! Log writer module
//!
//! Thread-safe, level-filtered log writing to files or stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Parse a level name; unknown names fall back to `Info`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }
}

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(File),
}

/// Thread-safe log writer
pub struct LogWriter {
    threshold: Level,
    /// Access and info output
    access: Mutex<LogTarget>,
    /// Warning and error output
    error: Mutex<LogTarget>,
}

impl LogWriter {
    fn new(
        threshold: Level,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };
        let error = match error_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            threshold,
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }

    /// Whether messages at `level` pass the configured threshold
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.threshold
    }

    /// Route a message to the error or info target by level
    pub fn write(&self, level: Level, message: &str) {
        let target = match level {
            Level::Error | Level::Warn => &self.error,
            Level::Info | Level::Debug => &self.access,
        };
        if let Ok(mut guard) = target.lock() {
            write_to_target(&mut guard, message);
        }
    }

    /// Write to access log (never filtered)
    pub fn write_access(&self, message: &str) {
        if let Ok(mut guard) = self.access.lock() {
            write_to_target(&mut guard, message);
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &mut LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => println!("{message}"),
        LogTarget::Stderr => eprintln!("{message}"),
        LogTarget::File(file) => {
            let _ = writeln!(file, "{message}");
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(
    threshold: Level,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(threshold, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer
///
/// Panics if `init()` has not been called.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::writer::init() first.")
}

/// Check if the log writer has been initialized
pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("DEBUG"), Level::Debug);
        assert_eq!(Level::parse("warning"), Level::Warn);
        assert_eq!(Level::parse("error"), Level::Error);
        assert_eq!(Level::parse("verbose"), Level::Info);
    }

    #[test]
    fn test_threshold_filters_and_routes_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("logs/access.log");
        let error = dir.path().join("logs/error.log");
        let writer = LogWriter::new(
            Level::Warn,
            access.to_str(),
            error.to_str(),
        )
        .unwrap();

        assert!(writer.enabled(Level::Error));
        assert!(!writer.enabled(Level::Info));

        writer.write(Level::Warn, "[WARN] disk slow");
        writer.write_access("GET / 200");

        assert_eq!(std::fs::read_to_string(&error).unwrap(), "[WARN] disk slow\n");
        assert_eq!(std::fs::read_to_string(&access).unwrap(), "GET / 200\n");
    }
}
