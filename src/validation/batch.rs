//! Batch validation of descriptor files.
//!
//! Files are independent of each other, so a batch runs on the rayon pool
//! when the options allow it. Results always come back in input order.

use crate::core::error::{OgnError, OgnResult};
use crate::validation::pipeline::{ValidationOutcome, ValidationPipeline};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of descriptor documents.
pub const DESCRIPTOR_EXTENSION: &str = "ogn";

/// Outcome of validating one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// `Err` when the file could not be read or is not JSON.
    pub result: OgnResult<ValidationOutcome>,
}

impl FileOutcome {
    pub fn is_accepted(&self, strict: bool) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_accepted(strict))
    }
}

/// Overall verdict of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every file was accepted.
    Accepted,
    /// Every file was read and parsed, but at least one was rejected.
    Rejected,
    /// At least one file could not be read or is not JSON.
    Failed,
}

impl BatchStatus {
    /// Process exit code: 0 accepted, 1 rejected, 2 failed.
    pub fn exit_code(self) -> u8 {
        match self {
            BatchStatus::Accepted => 0,
            BatchStatus::Rejected => 1,
            BatchStatus::Failed => 2,
        }
    }
}

/// Outcomes of a whole batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files accepted.
    pub fn accepted(&self, strict: bool) -> usize {
        self.files.iter().filter(|f| f.is_accepted(strict)).count()
    }

    /// Files that could not be read or parsed.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &OgnError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.path.as_path(), e)))
    }

    /// Total number of node definitions accepted across the batch.
    pub fn node_count(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().ok())
            .map(|outcome| outcome.model.len())
            .sum()
    }

    /// Whether every file was accepted.
    pub fn all_accepted(&self, strict: bool) -> bool {
        self.accepted(strict) == self.len()
    }

    /// Read failures outrank rejections.
    pub fn status(&self, strict: bool) -> BatchStatus {
        if self.failures().next().is_some() {
            BatchStatus::Failed
        } else if self.all_accepted(strict) {
            BatchStatus::Accepted
        } else {
            BatchStatus::Rejected
        }
    }
}

/// Expand files and directories into the descriptor files to validate.
///
/// Directories are walked recursively for `*.ogn` files; paths given
/// explicitly are kept whatever their extension. The result is sorted.
pub fn collect_descriptor_files(roots: &[PathBuf]) -> OgnResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        if !root.exists() {
            return Err(OgnError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: no such file or directory", root.display()),
            )));
        }
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(std::io::Error::from)?;
            let is_descriptor = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION);
            if entry.file_type().is_file() && is_descriptor {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Validate many files with one pipeline.
pub fn validate_batch(pipeline: &ValidationPipeline, paths: &[PathBuf]) -> BatchReport {
    let options = pipeline.options();
    let run = || -> Vec<FileOutcome> {
        let validate = |path: &PathBuf| FileOutcome {
            path: path.clone(),
            result: pipeline.validate_file(path),
        };
        if options.parallel {
            paths.par_iter().map(validate).collect()
        } else {
            paths.iter().map(validate).collect()
        }
    };

    let files = if options.parallel && options.max_threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!("falling back to the global thread pool: {}", e);
                run()
            }
        }
    } else {
        run()
    };

    let report = BatchReport { files };
    log::info!(
        "validated {} file(s): {} accepted, {} node(s)",
        report.len(),
        report.accepted(options.strict),
        report.node_count()
    );
    report
}
