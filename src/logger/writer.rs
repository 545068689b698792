//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr. Targets are fixed once
//! `init` runs.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and info messages
    access: LogTarget,
    /// Warnings and errors
    error: LogTarget,
    /// Most verbose level that is still written
    max_level: Level,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        max_level: Level,
    ) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
            max_level,
        })
    }

    /// Write to access log; access lines ignore the level filter
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Write a leveled message to the matching target
    pub fn write(&self, level: Level, message: &str) {
        if level > self.max_level {
            return;
        }
        match level {
            Level::Error | Level::Warn => self.error.write_line(message),
            Level::Info | Level::Debug => self.access.write_line(message),
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

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    max_level: Level,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, max_level)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_target_and_level_filter() {
        let dir = TempDir::new().unwrap();
        let access = dir.path().join("logs/access.log");
        let error = dir.path().join("logs/error.log");

        let writer = LogWriter::new(
            Some(access.to_str().unwrap()),
            Some(error.to_str().unwrap()),
            Level::Info,
        )
        .unwrap();

        writer.write_access("GET /welcome");
        writer.write(Level::Info, "started");
        writer.write(Level::Debug, "hidden");
        writer.write(Level::Warn, "careful");

        let access_log = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_log, "GET /welcome\nstarted\n");
        let error_log = std::fs::read_to_string(&error).unwrap();
        assert_eq!(error_log, "careful\n");
    }
}
