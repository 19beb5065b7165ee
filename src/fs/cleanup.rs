//! End-of-job result collection.
//!
//! The tool writes its report into the hidden analysis directory. Before the
//! wrapper exits, the report is surfaced in the job directory: the optional
//! zip is renamed to a fixed name, the remaining output is copied up, and the
//! empty directories the tool leaves behind are removed.

use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use super::JobPaths;

/// Fixed name of the result zip in the job directory.
pub const RESULTS_ZIP: &str = "chip2chip_results.zip";

/// Collects the tool's output into the job directory when dropped.
///
/// Create it before any step that can fail so that results and partial
/// output reach the job directory on every exit path. Failures are logged
/// and never propagated.
#[derive(Debug)]
pub struct JobCleanup {
    paths: JobPaths,
    collect_zip: bool,
}

impl JobCleanup {
    #[must_use]
    pub fn new(paths: JobPaths, collect_zip: bool) -> Self {
        Self { paths, collect_zip }
    }

    fn run(&self) {
        self.collect_results();
        // The tool creates a directory named after the current date, usually left empty.
        if let Err(e) = remove_empty_dirs(self.paths.job_dir()) {
            warn!("Failed to remove empty directories: {e:#}");
        }
    }

    fn collect_results(&self) {
        let analysis = self.paths.analysis_dir();
        if !analysis.exists() {
            return;
        }

        if self.collect_zip
            && let Err(e) = move_result_zip(&analysis, &self.paths.results_zip())
        {
            error!("Error collecting result zip: {e:#}");
        }

        if let Err(e) = copy_dir_contents(&analysis, self.paths.job_dir()) {
            error!("Error during clean-up: {e:#}");
        }
    }
}

impl Drop for JobCleanup {
    fn drop(&mut self) {
        self.run();
    }
}

/// Moves the single zip directly inside `analysis_dir` to `dest`.
///
/// Returns `Ok(None)` when there is no zip.
///
/// # Errors
///
/// Returns an error if more than one zip was produced or the move fails.
pub fn move_result_zip(analysis_dir: &Path, dest: &Path) -> Result<Option<PathBuf>> {
    let mut zips = Vec::new();
    for entry in std::fs::read_dir(analysis_dir)
        .with_context(|| format!("Failed to read {}", analysis_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "zip") {
            zips.push(path);
        }
    }

    let zip = match zips.as_slice() {
        [] => return Ok(None),
        [zip] => zip,
        _ => bail!("Internal Error: multiple ZIP files created"),
    };

    move_file(zip, dest)
        .with_context(|| format!("Internal error moving result ZIP {}", zip.display()))?;
    debug!("Moved {} to {}", zip.display(), dest.display());
    Ok(Some(dest.to_path_buf()))
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Rename fails across file systems; fall back to copy and delete.
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}

/// Recursively copies the contents of `src` into `dest`, merging with and
/// overwriting whatever is already there.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or a file cannot be copied.
pub fn copy_dir_contents(src: &Path, dest: &Path) -> Result<()> {
    let walker = WalkBuilder::new(src)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Unexpected entry {}", entry.path().display()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(relative);
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }

    Ok(())
}

/// Deletes the empty directories directly inside `dir`. Does not recurse.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed. Individual removal failures
/// are logged and skipped.
pub fn remove_empty_dirs(dir: &Path) -> Result<()> {
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let is_empty = std::fs::read_dir(&path).is_ok_and(|mut entries| entries.next().is_none());
        if is_empty && let Err(e) = std::fs::remove_dir(&path) {
            warn!("Failed to remove empty directory {}: {e}", path.display());
        }
    }
    Ok(())
}
