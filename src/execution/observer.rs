use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use super::report::RunSummary;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational progress.
    Info,
    /// Data-quality signal (skipped lines/sheets); nothing failed.
    Warning,
    /// A file or table failed; the run continues.
    Error,
    /// The run was aborted, or an infrastructure (I/O) failure.
    Critical,
}

/// Events emitted by the pipeline while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    RunStarted {
        source_dir: PathBuf,
    },
    StoreConnected,
    FileStarted {
        path: PathBuf,
    },
    FileFailed {
        path: PathBuf,
        error: String,
        io: bool,
    },
    SheetSkipped {
        path: PathBuf,
        sheet: String,
        reason: String,
    },
    LinesSkipped {
        path: PathBuf,
        skipped: usize,
        total_lines: usize,
    },
    /// A sheet or partition had no rows or no columns left and was not written.
    RowSetSkipped {
        path: PathBuf,
        sheet: String,
        key: Option<String>,
    },
    TableWritten {
        table: String,
        rows: usize,
    },
    TableFailed {
        table: String,
        rows_written: usize,
        error: String,
    },
    RunAborted {
        reason: String,
    },
    RunFinished {
        summary: RunSummary,
    },
}

impl LoadEvent {
    /// Severity used for alert thresholds.
    pub fn severity(&self) -> Severity {
        match self {
            LoadEvent::RunAborted { .. } => Severity::Critical,
            LoadEvent::FileFailed { io: true, .. } => Severity::Critical,
            LoadEvent::FileFailed { .. } | LoadEvent::TableFailed { .. } => Severity::Error,
            LoadEvent::SheetSkipped { .. } | LoadEvent::LinesSkipped { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadEvent::RunStarted { source_dir } => {
                write!(f, "loading files from {}", source_dir.display())
            }
            LoadEvent::StoreConnected => write!(f, "store connection ok"),
            LoadEvent::FileStarted { path } => write!(f, "processing {}", path.display()),
            LoadEvent::FileFailed { path, error, .. } => {
                write!(f, "failed reading {}: {error}", path.display())
            }
            LoadEvent::SheetSkipped {
                path,
                sheet,
                reason,
            } => write!(
                f,
                "skipped sheet '{sheet}' of {}: {reason}",
                path.display()
            ),
            LoadEvent::LinesSkipped {
                path,
                skipped,
                total_lines,
            } => write!(
                f,
                "{skipped} of {total_lines} lines skipped as malformed in {}",
                path.display()
            ),
            LoadEvent::RowSetSkipped { path, sheet, key } => match key {
                Some(key) => write!(
                    f,
                    "nothing to write for sheet '{sheet}' key '{key}' of {}",
                    path.display()
                ),
                None => write!(
                    f,
                    "nothing to write for sheet '{sheet}' of {}",
                    path.display()
                ),
            },
            LoadEvent::TableWritten { table, rows } => {
                write!(f, "wrote {rows} rows to table `{table}`")
            }
            LoadEvent::TableFailed {
                table,
                rows_written,
                error,
            } => write!(
                f,
                "failed writing table `{table}` after {rows_written} rows: {error}"
            ),
            LoadEvent::RunAborted { reason } => write!(f, "run aborted: {reason}"),
            LoadEvent::RunFinished { summary } => write!(f, "done: {summary}"),
        }
    }
}

/// Observer interface for load progress.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called for every event.
    fn on_event(&self, _event: &LoadEvent) {}

    /// Called (after `on_event`) when an event meets the alert threshold.
    ///
    /// Default behavior does nothing beyond the `on_event` call already made.
    fn on_alert(&self, _event: &LoadEvent, _severity: Severity) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_event(&self, event: &LoadEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_alert(&self, event: &LoadEvent, severity: Severity) {
        for o in &self.observers {
            o.on_alert(event, severity);
        }
    }
}

/// Writes human-readable progress lines to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_event(&self, event: &LoadEvent) {
        match event.severity() {
            Severity::Info => eprintln!("[load] {event}"),
            sev => eprintln!("[load][{sev:?}] {event}"),
        }
    }

    fn on_alert(&self, event: &LoadEvent, severity: Severity) {
        eprintln!("[ALERT][load][{severity:?}] {event}");
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_event(&self, event: &LoadEvent) {
        self.append_line(&format!(
            "{} {:?} {event}",
            unix_ts(),
            event.severity()
        ));
    }

    fn on_alert(&self, event: &LoadEvent, severity: Severity) {
        self.append_line(&format!("{} ALERT severity={severity:?} {event}", unix_ts()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
