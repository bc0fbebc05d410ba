//! Intake directory watcher.
//!
//! Picks up the newest payload file dropped into the intake directory, runs
//! it through a [`DocumentProcessor`], and moves the input into the processed
//! (or failed) directory so it is not picked up again.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use billrecon_core::{DocumentProcessor, IntakeConfig, ReferenceSource};
use billrecon_model::ReconciledRecord;
use tracing::{debug, info, warn};

/// What happened to one intake file.
#[derive(Debug)]
pub enum IntakeOutcome {
    Processed {
        source: PathBuf,
        archived: PathBuf,
        output: PathBuf,
        record: Box<ReconciledRecord>,
    },
    Failed {
        source: PathBuf,
        archived: PathBuf,
        error: String,
    },
}

impl IntakeOutcome {
    pub fn source(&self) -> &Path {
        match self {
            Self::Processed { source, .. } | Self::Failed { source, .. } => source,
        }
    }
}

/// Returns the most recently modified file in `dir` with one of
/// `extensions` (case-insensitive). Ties go to the greater file name.
pub fn next_input(dir: &Path, extensions: &[String]) -> Result<Option<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read intake directory {}", dir.display()))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("read intake directory {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.starts_with("~$") {
            continue;
        }
        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if !accepted {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .with_context(|| format!("read metadata of {}", path.display()))?;

        let is_newer = match &newest {
            None => true,
            Some((time, current)) => {
                (modified, path.file_name()) > (*time, current.file_name())
            }
        };
        if is_newer {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Moves `path` into `dir`, creating it if needed.
///
/// An existing file of the same name is kept; the moved file gets a
/// numbered name instead.
pub fn move_into(path: &Path, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let mut target = dir.join(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut counter = 1usize;
    while target.exists() {
        target = dir.join(format!("{stem} ({counter}){extension}"));
        counter += 1;
    }

    if std::fs::rename(path, &target).is_err() {
        // Different filesystem: copy, then remove the original.
        std::fs::copy(path, &target)
            .with_context(|| format!("copy {} to {}", path.display(), target.display()))?;
        std::fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    }
    debug!(from = %path.display(), to = %target.display(), "Moved intake file");
    Ok(target)
}

/// Polls the intake directory and processes one document at a time.
pub struct IntakeWatcher<S> {
    config: IntakeConfig,
    processor: DocumentProcessor<S>,
}

impl<S: ReferenceSource> IntakeWatcher<S> {
    pub fn new(config: IntakeConfig, processor: DocumentProcessor<S>) -> Self {
        Self { config, processor }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Processes the newest waiting file, if any.
    ///
    /// Document-level failures (unreadable text, malformed payload) move the
    /// file to the failed directory and are reported as an outcome. Anything
    /// else, a missing reference dataset in particular, leaves the file in
    /// place and is returned as an error.
    pub fn poll_once(&self) -> Result<Option<IntakeOutcome>> {
        let Some(source) = next_input(&self.config.directory, &self.config.extensions)? else {
            return Ok(None);
        };
        info!(path = %source.display(), "Picked up intake file");

        match self.processor.process(&source) {
            Ok(done) => {
                let archived = move_into(&source, &self.config.processed_directory)?;
                Ok(Some(IntakeOutcome::Processed {
                    source,
                    archived,
                    output: done.output,
                    record: Box::new(done.record),
                }))
            }
            Err(error) if error.is_document_error() => {
                warn!(path = %source.display(), %error, "Document failed");
                let archived = move_into(&source, &self.config.failed_directory)?;
                Ok(Some(IntakeOutcome::Failed {
                    source,
                    archived,
                    error: error.to_string(),
                }))
            }
            Err(error) => {
                Err(error).with_context(|| format!("process {}", source.display()))
            }
        }
    }

    /// Processes files until the directory is empty.
    pub fn drain(&self, mut on_outcome: impl FnMut(&IntakeOutcome)) -> Result<usize> {
        let mut count = 0;
        while let Some(outcome) = self.poll_once()? {
            on_outcome(&outcome);
            count += 1;
        }
        Ok(count)
    }

    /// Polls forever, sleeping between empty polls. Returns only on error.
    pub fn run(&self, mut on_outcome: impl FnMut(&IntakeOutcome)) -> Result<()> {
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        info!(
            directory = %self.config.directory.display(),
            interval_secs = self.config.poll_interval_secs,
            "Watching intake directory"
        );
        loop {
            match self.poll_once()? {
                Some(outcome) => on_outcome(&outcome),
                None => std::thread::sleep(interval),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "{}").unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    fn extensions() -> Vec<String> {
        vec!["txt".to_string(), "json".to_string()]
    }

    #[test]
    fn test_next_input_picks_newest_accepted_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.txt", 100);
        let newest = touch(dir.path(), "new.JSON", 10);
        touch(dir.path(), "scan.pdf", 1);
        touch(dir.path(), ".hidden.txt", 1);
        std::fs::create_dir(dir.path().join("processed.txt")).unwrap();

        assert_eq!(next_input(dir.path(), &extensions()).unwrap(), Some(newest));
    }

    #[test]
    fn test_next_input_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_input(dir.path(), &extensions()).unwrap(), None);
    }

    #[test]
    fn test_move_into_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("processed");
        let first = touch(dir.path(), "order.txt", 0);
        let moved = move_into(&first, &archive).unwrap();
        assert_eq!(moved, archive.join("order.txt"));
        assert!(!first.exists());

        let second = touch(dir.path(), "order.txt", 0);
        let moved = move_into(&second, &archive).unwrap();
        assert_eq!(moved, archive.join("order (1).txt"));
        assert!(archive.join("order.txt").exists());
    }
}
