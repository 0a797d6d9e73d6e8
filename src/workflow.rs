use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, Result, TranslitError};
use crate::files::{FileSystem, FileSystemFactory, FileTreeWalker};
use crate::tags::{TagField, TagLibrary, TagLibraryFactory};
use crate::transliterate::Transliterator;

/// Switches controlling what happens to each file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Transliterate file names
    pub rename: bool,
    /// Transliterate tags
    pub retag: bool,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            rename: true,
            retag: true,
            recursive: false,
        }
    }
}

/// Everything a run needs, built once before the first file is touched
#[derive(Debug, Clone)]
pub struct TranslitContext {
    pub transliterator: Transliterator,
    pub options: ProcessOptions,
}

impl TranslitContext {
    pub fn new(transliterator: Transliterator, options: ProcessOptions) -> Self {
        Self {
            transliterator,
            options,
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success { renamed_to: Option<PathBuf> },
    Failure { kind: ErrorKind, message: String },
}

impl ProcessingOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: ProcessingOutcome,
}

/// Outcomes of a whole run, in processing order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn push(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.total() - self.failed()
    }

    /// True when any file failed, regardless of where in the run it happened
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|r| r.outcome.is_failure())
    }
}

pub struct Workflow {
    context: TranslitContext,
    fs: Box<dyn FileSystem>,
    tags: Box<dyn TagLibrary>,
}

impl Workflow {
    pub fn new(context: TranslitContext, fs: Box<dyn FileSystem>, tags: Box<dyn TagLibrary>) -> Self {
        Self { context, fs, tags }
    }

    /// Workflow over the local disk and ID3 tags
    pub fn with_defaults(context: TranslitContext) -> Self {
        Self::new(
            context,
            FileSystemFactory::create_default(),
            TagLibraryFactory::create_default(),
        )
    }

    /// Enumerate candidate files below every root, in argument order
    pub fn collect_files<P: AsRef<Path>>(&self, roots: &[P]) -> Vec<PathBuf> {
        let walker = FileTreeWalker::new(self.fs.as_ref(), self.context.options.recursive);
        let files = walker.walk_all(roots);
        info!("Found {} files to process", files.len());
        files
    }

    /// Process files one after another; `on_report` sees each result as it is produced
    pub fn process_files_with<F>(&self, files: &[PathBuf], mut on_report: F) -> RunSummary
    where
        F: FnMut(&FileReport),
    {
        let mut summary = RunSummary::default();

        for path in files {
            let report = self.process_file(path);
            on_report(&report);
            summary.push(report);
        }

        info!(
            "Processed {} files: {} succeeded, {} failed",
            summary.total(),
            summary.succeeded(),
            summary.failed()
        );
        summary
    }

    pub fn process_files(&self, files: &[PathBuf]) -> RunSummary {
        self.process_files_with(files, |_| {})
    }

    /// Rename and retag a single file. Failures are captured in the report.
    pub fn process_file(&self, path: &Path) -> FileReport {
        let outcome = match self.try_process(path) {
            Ok(current) => {
                let renamed_to = (current != path).then_some(current);
                ProcessingOutcome::Success { renamed_to }
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                ProcessingOutcome::Failure {
                    kind: e.kind(),
                    message: e.reason(),
                }
            }
        };

        FileReport {
            path: path.to_path_buf(),
            outcome,
        }
    }

    fn try_process(&self, path: &Path) -> Result<PathBuf> {
        let current = if self.context.options.rename {
            self.rename(path)?
        } else {
            path.to_path_buf()
        };

        if self.context.options.retag {
            self.retag(&current)?;
        }

        Ok(current)
    }

    /// Transliterate the file name, leaving the directory part untouched
    fn rename(&self, path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| TranslitError::FileAccess(format!("{} has no file name", path.display())))?;
        let name = name.to_str().ok_or_else(|| {
            TranslitError::FileAccess(format!("File name of {} is not valid Unicode", path.display()))
        })?;

        let new_name = self.context.transliterator.apply(name);
        if new_name == name {
            debug!("File name of {} unchanged", path.display());
            return Ok(path.to_path_buf());
        }

        if new_name.is_empty() || new_name.chars().any(std::path::is_separator) {
            return Err(TranslitError::FileAccess(format!(
                "Cannot rename {} to '{}'",
                path.display(),
                new_name
            )));
        }

        let destination = path.with_file_name(&new_name);
        self.fs.move_file(path, &destination)?;

        info!("Renamed {} -> {}", path.display(), destination.display());
        Ok(destination)
    }

    fn retag(&self, path: &Path) -> Result<()> {
        let mut container = self.tags.open(path)?;
        let transliterator = &self.context.transliterator;

        for field in TagField::ALL {
            let value = container.get_field(field);
            container.set_field(field, value.map(|text| transliterator.apply(text)));
        }

        container.save()?;
        debug!("Tags of {} processed", path.display());
        Ok(())
    }
}
