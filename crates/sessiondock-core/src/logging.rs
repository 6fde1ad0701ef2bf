//! Request trace logging.
//!
//! Remote calls can be traced to an append-only file, one timestamped line per
//! request and response. Everything else goes through the `log` facade.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{SecondsFormat, Utc};

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// Current UTC time as ISO 8601 with milliseconds (e.g. 2026-02-04T10:15:30.123Z).
fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, direction: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let _ = writeln!(file, "[{}] {}: {}", utc_timestamp(), direction, data);
            let _ = file.flush();
        }
    }
}

/// Open (or create) `{log_dir}/{log_id}.log` and return a shared handle.
///
/// With no directory, or if the file cannot be opened, the handle is empty
/// and [`log_line`] does nothing.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", log_id)))
            .ok()
    });
    Arc::new(Mutex::new(file))
}

/// A handle that discards everything.
pub fn disabled() -> LogHandle {
    Arc::new(Mutex::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn utc_timestamp_format() {
        let ts = utc_timestamp();
        // YYYY-MM-DDTHH:MM:SS.mmmZ
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), 24);
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn open_log_file_creates_file() {
        let dir = tempdir().unwrap();

        let handle = open_log_file(Some(dir.path()), "remote");
        assert!(handle.lock().unwrap().is_some());
        assert!(dir.path().join("remote.log").exists());
    }

    #[test]
    fn open_log_file_none_dir() {
        let handle = open_log_file(None, "remote");
        assert!(handle.lock().unwrap().is_none());
    }

    #[test]
    fn log_line_appends() {
        let dir = tempdir().unwrap();
        let handle = open_log_file(Some(dir.path()), "remote");

        log_line(&handle, "REQUEST", "GET /newsession");
        log_line(&handle, "RESPONSE", "abc123");

        let contents = fs::read_to_string(dir.path().join("remote.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("REQUEST: GET /newsession"));
        assert!(lines[1].ends_with("RESPONSE: abc123"));
    }

    #[test]
    fn log_line_handles_disabled_handle() {
        // Should not panic
        log_line(&disabled(), "REQUEST", "test");
    }
}
