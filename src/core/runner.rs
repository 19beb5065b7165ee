//! Job orchestration.
//!
//! A job is: prepare the working directory, check parameters, write the
//! parameter file, run the tool, then collect results. Result collection is
//! tied to a guard so it happens on every path out of [`run_job`].

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use super::config::{JobConfig, ToolProperties};
use super::executor::{AnalysisTool, print_output};
use super::param_file::write_param_file;
use super::params::{ParameterErrors, check_parameters};
use crate::fs::{JobCleanup, JobPaths};

/// Buffer size for the tool output channel.
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Parameter checking failed; the tool was not started.
    InvalidParameters(ParameterErrors),
    /// The tool ran and exited with this code.
    ToolExited(i32),
}

impl JobOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidParameters(_) => 1,
            Self::ToolExited(code) => *code,
        }
    }
}

/// Runs one job in `config.job_dir` using `tool`.
///
/// # Errors
///
/// Returns an error if the working directory or parameter file cannot be
/// written, or if the tool cannot be run to completion.
pub async fn run_job(
    config: &JobConfig,
    tool: &dyn AnalysisTool,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<JobOutcome> {
    let paths = JobPaths::new(&config.job_dir);
    paths.ensure_analysis_dir()?;
    let _cleanup = JobCleanup::new(paths.clone(), config.create_zip);

    let params = match check_parameters(config, &paths) {
        Ok(params) => params,
        Err(errors) => {
            error!(
                "There were one or more errors with the job parameters. Please check stderr.txt for details."
            );
            return Ok(JobOutcome::InvalidParameters(errors));
        }
    };

    let param_file = paths.param_file();
    write_param_file(&param_file, &params, &paths.analysis_dir())?;

    let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let printer = tokio::spawn(print_output(output_rx));

    info!("Starting {}", tool.name());
    let result = tool
        .run(
            &param_file,
            &ToolProperties::for_mode(config.dev_mode),
            output_tx,
            shutdown_rx,
        )
        .await;
    let _ = printer.await;

    let code = result?;
    info!("{} exited with code {code}", tool.name());
    Ok(JobOutcome::ToolExited(code))
}
