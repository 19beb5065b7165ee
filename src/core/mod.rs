//! Core job logic: parameter checking, selector resolution and tool launch.

pub mod cli_check;
pub mod config;
pub mod executor;
pub mod param_file;
pub mod params;
pub mod runner;
pub mod selector;
pub mod shutdown;

pub use cli_check::{CommandResolution, is_safe_command_name, resolve_tool_command};
pub use config::{Delimiter, JobConfig, ToolProperties};
pub use executor::{AnalysisTool, ExternalTool, ToolOutput};
pub use param_file::{ParamEntry, write_param_file};
pub use params::{JobParameters, ParamProblem, ParameterErrors, check_parameters};
pub use runner::{JobOutcome, run_job};
pub use selector::{SelectionError, SelectionToken, resolve};
pub use shutdown::forward_shutdown_signals;

/// Gene set matrix layout written by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One gene set per column (`.gmx`).
    Gmx,
    /// One gene set per row (`.gmt`).
    #[default]
    Gmt,
}

impl OutputFormat {
    /// Parses the user's format choice.
    ///
    /// Only a case-insensitive `gmx` selects [`OutputFormat::Gmx`]; anything
    /// else, including no value, means [`OutputFormat::Gmt`].
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("gmx") => Self::Gmx,
            _ => Self::Gmt,
        }
    }

    /// Returns the token the tool expects in its parameter file.
    #[must_use]
    pub const fn tool_token(&self) -> &'static str {
        match self {
            Self::Gmx => "GeneSetMatrix[gmx]",
            Self::Gmt => "GeneSetMatrix_Transposed[gmt]",
        }
    }
}
