//! Run orchestration: walk the source directory and push every file/sheet/partition through
//! read → partition → name → write.
//!
//! A run moves through these phases:
//!
//! 1. probe the store ([`LoadEvent::RunStarted`], then [`LoadEvent::StoreConnected`])
//! 2. list recognized files in the source directory
//! 3. process each file in path order
//! 4. finish ([`LoadEvent::RunFinished`])
//!
//! Steps 1 and 2 are preconditions: an unreachable store, a missing directory or a directory
//! with no recognized files aborts the run ([`LoadEvent::RunAborted`]) before anything is
//! written. From step 3 on, failures are isolated to the smallest unit (file, sheet, table),
//! reported, and the run goes on.

mod observer;
mod report;
mod writer;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{LoadError, LoadResult};
use crate::ingestion::{ReadIssue, ReadOptions, TabularFormat, TabularRead, read_tabular};
use crate::naming::{TableName, table_name_for};
use crate::processing::{PartitionOptions, partition};
use crate::store::Store;

pub use observer::{
    CompositeObserver, FileObserver, LoadEvent, LoadObserver, Severity, StdErrObserver,
};
pub use report::{FileReport, RunReport, RunSummary, SkippedSheetReport, TableReport};
pub use writer::{DEFAULT_BATCH_SIZE, WriteOptions, WriteOutcome, write_table};

/// Configuration for a [`Pipeline`] run.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Directory holding the `.xlsx`/`.xls`/`.csv` files.
    pub source_dir: PathBuf,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Reader options.
    pub read: ReadOptions,
    /// Partitioner options.
    pub partition: PartitionOptions,
    /// Writer options.
    pub write: WriteOptions,
    /// Optional observer for progress/diagnostics.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl PipelineOptions {
    /// Options with defaults for everything but the source directory.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            recursive: false,
            read: ReadOptions::default(),
            partition: PartitionOptions::default(),
            write: WriteOptions::default(),
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("source_dir", &self.source_dir)
            .field("recursive", &self.recursive)
            .field("read", &self.read)
            .field("partition", &self.partition)
            .field("write", &self.write)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Sequential loader over one store.
///
/// The pipeline owns its store handle for the duration of the run (pass `&mut store` to keep
/// ownership outside); the handle is released when the pipeline is dropped, whichever way the
/// run ended.
pub struct Pipeline<S: Store> {
    store: S,
    options: PipelineOptions,
}

impl<S: Store> Pipeline<S> {
    pub fn new(store: S, options: PipelineOptions) -> Self {
        Self { store, options }
    }

    /// Attach an observer for load events.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.options.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Execute one full run.
    ///
    /// Returns `Err` only for precondition failures (see [`LoadError::is_precondition`]);
    /// per-file and per-table failures are recorded in the returned [`RunReport`].
    pub fn run(&mut self) -> LoadResult<RunReport> {
        let source_dir = self.options.source_dir.clone();
        self.emit(LoadEvent::RunStarted {
            source_dir: source_dir.clone(),
        });

        if let Err(e) = self.store.execute_probe() {
            return Err(self.abort(LoadError::StoreUnreachable(e)));
        }
        self.emit(LoadEvent::StoreConnected);

        let files = match list_source_files(&source_dir, self.options.recursive) {
            Ok(files) if files.is_empty() => {
                return Err(self.abort(LoadError::NoSourceFiles { path: source_dir }));
            }
            Ok(files) => files,
            Err(e) => return Err(self.abort(e)),
        };

        let mut report = RunReport {
            source_dir,
            files: Vec::with_capacity(files.len()),
        };
        for path in files {
            let file_report = self.process_file(&path);
            report.files.push(file_report);
        }

        self.emit(LoadEvent::RunFinished {
            summary: report.summary(),
        });
        Ok(report)
    }

    /// Read, partition and write one file. Never fails: problems end up in the report.
    pub fn process_file(&mut self, path: &Path) -> FileReport {
        self.emit(LoadEvent::FileStarted {
            path: path.to_path_buf(),
        });
        let read = read_tabular(path, &self.options.read);
        self.process_read(path, read)
    }

    /// Partition and write the outcome of reading `path`.
    pub fn process_read(&mut self, path: &Path, read: LoadResult<TabularRead>) -> FileReport {
        let mut report = FileReport::new(path.to_path_buf());

        let read = match read {
            Ok(read) => read,
            Err(e) => {
                let io = matches!(e, LoadError::Io(_));
                self.emit(LoadEvent::FileFailed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                    io,
                });
                report.error = Some(e.to_string());
                return report;
            }
        };

        for issue in read.issues {
            match issue {
                ReadIssue::SheetSkipped { sheet, reason } => {
                    self.emit(LoadEvent::SheetSkipped {
                        path: path.to_path_buf(),
                        sheet: sheet.clone(),
                        reason: reason.clone(),
                    });
                    report
                        .skipped_sheets
                        .push(SkippedSheetReport { sheet, reason });
                }
                ReadIssue::LinesSkipped {
                    skipped,
                    total_lines,
                } => {
                    self.emit(LoadEvent::LinesSkipped {
                        path: path.to_path_buf(),
                        skipped,
                        total_lines,
                    });
                    report.skipped_lines += skipped;
                }
            }
        }

        let base = base_name(path);
        for sheet in read.sheets {
            if sheet.rows.is_empty() {
                self.emit(LoadEvent::RowSetSkipped {
                    path: path.to_path_buf(),
                    sheet: sheet.name,
                    key: None,
                });
                continue;
            }

            for part in partition(sheet.rows, &self.options.partition) {
                let table = table_name_for(&base, &sheet.name, part.key.as_deref());
                let outcome =
                    write_table(&mut self.store, &part.rows, &table, &self.options.write);
                if let Some(table_report) =
                    self.record_write(path, table, &sheet.name, part.key, outcome)
                {
                    report.tables.push(table_report);
                }
            }
        }
        report
    }

    fn record_write(
        &self,
        path: &Path,
        table: TableName,
        sheet: &str,
        key: Option<String>,
        outcome: WriteOutcome,
    ) -> Option<TableReport> {
        let (rows_written, batches, error) = match outcome {
            WriteOutcome::Skipped => {
                self.emit(LoadEvent::RowSetSkipped {
                    path: path.to_path_buf(),
                    sheet: sheet.to_string(),
                    key,
                });
                return None;
            }
            WriteOutcome::Written { rows, batches } => {
                self.emit(LoadEvent::TableWritten {
                    table: table.to_string(),
                    rows,
                });
                (rows, batches, None)
            }
            WriteOutcome::Failed {
                rows_written,
                batches,
                error,
            } => {
                self.emit(LoadEvent::TableFailed {
                    table: table.to_string(),
                    rows_written,
                    error: error.to_string(),
                });
                (rows_written, batches, Some(error.to_string()))
            }
        };

        Some(TableReport {
            table: table.into_string(),
            sheet: sheet.to_string(),
            key,
            rows_written,
            batches,
            error,
        })
    }

    fn abort(&self, err: LoadError) -> LoadError {
        self.emit(LoadEvent::RunAborted {
            reason: err.to_string(),
        });
        err
    }

    fn emit(&self, event: LoadEvent) {
        if let Some(obs) = &self.options.observer {
            obs.on_event(&event);
            let severity = event.severity();
            if severity >= self.options.alert_at_or_above {
                obs.on_alert(&event, severity);
            }
        }
    }
}

/// List regular files under `dir` with a recognized extension, sorted by path.
///
/// Only the top level is listed unless `recursive` is set. Entries that cannot be read (dangling
/// symlinks, unreadable subdirectories, files removed mid-walk) are logged and skipped.
pub fn list_source_files(dir: impl AsRef<Path>, recursive: bool) -> LoadResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(LoadError::SourceDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Only the root itself is a precondition; a bad entry inside it is skipped.
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && TabularFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// File name without its extension.
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
