//! File system operations.

use std::path::{Path, PathBuf};

use anyhow::Context;

pub mod cleanup;
pub mod settings;
pub mod staging;

pub use cleanup::{JobCleanup, RESULTS_ZIP};
pub use settings::{ToolSettings, load_settings, save_settings};
pub use staging::{read_database_list, stage_input};

/// Hidden working directory created inside the job directory.
pub const WORKING_DIR: &str = ".tmp_gsea";

/// Directory, inside the working directory, that the tool writes its report to.
pub const ANALYSIS_DIR: &str = "analysis";

/// Name of the generated parameter file.
pub const PARAM_FILE: &str = "chip2chip_param_file.txt";

/// Holds all job-related paths derived from the job directory.
///
/// The job directory is where the hosting environment expects results to
/// appear. Everything the wrapper creates for itself lives under the hidden
/// `.tmp_gsea` directory so it stays out of the job's visible file list.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use chip2chip::fs::JobPaths;
///
/// let paths = JobPaths::new(Path::new("/jobs/42"));
/// assert_eq!(paths.analysis_dir(), Path::new("/jobs/42/.tmp_gsea/analysis"));
/// ```
#[derive(Debug, Clone)]
pub struct JobPaths {
    job_dir: PathBuf,
}

impl JobPaths {
    /// Creates paths rooted at the given job directory.
    #[must_use]
    pub fn new(job_dir: &Path) -> Self {
        Self {
            job_dir: job_dir.to_path_buf(),
        }
    }

    /// Returns the job directory.
    #[must_use]
    pub fn job_dir(&self) -> &Path {
        &self.job_dir
    }

    /// Returns the hidden working directory (`.tmp_gsea`).
    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.job_dir.join(WORKING_DIR)
    }

    /// Returns the tool output directory (`.tmp_gsea/analysis`).
    #[must_use]
    pub fn analysis_dir(&self) -> PathBuf {
        self.working_dir().join(ANALYSIS_DIR)
    }

    /// Returns the parameter file path (`.tmp_gsea/chip2chip_param_file.txt`).
    #[must_use]
    pub fn param_file(&self) -> PathBuf {
        self.working_dir().join(PARAM_FILE)
    }

    /// Returns where the relocated result zip ends up.
    #[must_use]
    pub fn results_zip(&self) -> PathBuf {
        self.job_dir.join(RESULTS_ZIP)
    }

    /// Ensures the working and analysis directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn ensure_analysis_dir(&self) -> anyhow::Result<()> {
        let dir = self.analysis_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }
}
