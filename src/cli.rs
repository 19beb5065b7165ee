//! CLI argument parsing using clap.
//!
//! Option names match the parameter names the hosting job environment
//! passes on the command line. Values stay strings: flags such as
//! `--create_zip` arrive as `true`/`false` text.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::core::config::{JobConfig, is_true};
use crate::core::OutputFormat;
use crate::fs::load_settings;

/// Chip2Chip job wrapper
///
/// Checks the job parameters, writes a parameter file for the Chip2Chip tool,
/// runs it, and gathers its report into the job directory.
#[derive(Parser, Debug, Default)]
#[command(name = "chip2chip", version, about, long_about = None)]
pub struct Args {
    /// Chip platform file to convert gene sets to
    #[arg(long = "chip", value_name = "FILE")]
    pub chip: Option<String>,

    /// File listing the gene set database files, one path per line
    #[arg(long = "gmx", value_name = "FILE")]
    pub gmx: Option<String>,

    /// Output matrix format: gmx or gmt
    #[arg(long = "genesetmatrix_format", value_name = "FORMAT")]
    pub genesetmatrix_format: Option<String>,

    /// Whether to show the etiology of each converted gene (passed to the tool)
    #[arg(long = "show_etiology", value_name = "BOOL")]
    pub show_etiology: Option<String>,

    /// Gene sets to convert, as file_name#gene_set_name (or gene_set_name with a single file)
    #[arg(long = "selected_gene_sets", value_name = "LIST")]
    pub selected_gene_sets: Option<String>,

    /// Single character used instead of ',' to separate selected gene sets
    #[arg(long = "altDelim", value_name = "CHAR")]
    pub alt_delim: Option<String>,

    /// Whether to collect the report as chip2chip_results.zip
    #[arg(long = "create_zip", value_name = "BOOL")]
    pub create_zip: Option<String>,

    /// Developer mode: disables the tool's update check
    #[arg(long = "dev_mode", value_name = "BOOL")]
    pub dev_mode: Option<String>,

    /// Job directory (default: current directory)
    #[arg(long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// JSON file describing how to launch the tool
    #[arg(long = "tool-settings", value_name = "FILE", env = "CHIP2CHIP_TOOL_SETTINGS")]
    pub tool_settings: Option<PathBuf>,
}

impl Args {
    /// Builds the job configuration, loading tool settings if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed but unavailable,
    /// or the tool settings file exists but cannot be parsed.
    pub fn into_job_config(self) -> Result<JobConfig> {
        let job_dir = match self.work_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let tool = match &self.tool_settings {
            Some(path) => load_settings(path)?,
            None => crate::fs::ToolSettings::default(),
        };

        Ok(JobConfig {
            job_dir,
            chip_platform: self.chip,
            gene_set_databases: self.gmx,
            output_format: OutputFormat::from_param(self.genesetmatrix_format.as_deref()),
            show_etiology: self.show_etiology,
            selected_gene_sets: self.selected_gene_sets,
            alt_delim: self.alt_delim,
            create_zip: is_true(self.create_zip.as_deref()),
            dev_mode: is_true(self.dev_mode.as_deref()),
            tool,
        })
    }
}
