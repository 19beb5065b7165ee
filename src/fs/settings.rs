//! Tool launch settings.
//!
//! The analysis tool is launched from a command plus fixed leading
//! arguments. Sites that install the tool somewhere unusual describe it in a
//! small JSON file instead of rebuilding the wrapper.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default launcher script shipped with the gene set analysis tool.
pub const DEFAULT_TOOL_COMMAND: &str = "gsea-cli.sh";

/// Default tool name passed to the launcher script.
pub const DEFAULT_TOOL_NAME: &str = "Chip2Chip";

/// How to launch the analysis tool.
///
/// The wrapper appends `-param_file <path>` after `args`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolSettings {
    /// Command name (looked up on `PATH`) or path to an executable.
    pub command: String,
    /// Arguments placed before the parameter file arguments.
    pub args: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_TOOL_COMMAND.to_string(),
            args: vec![DEFAULT_TOOL_NAME.to_string()],
        }
    }
}

/// Loads settings from the specified file path.
///
/// If the file doesn't exist, returns default settings.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<ToolSettings> {
    if !path.exists() {
        return Ok(ToolSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tool settings: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tool settings: {}", path.display()))
}

/// Saves settings as pretty-printed JSON.
///
/// The parent directory must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_settings(path: &Path, settings: &ToolSettings) -> Result<()> {
    let json =
        serde_json::to_string_pretty(settings).context("Failed to serialize tool settings")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write tool settings: {}", path.display()))
}
