//! Explicit job configuration.
//!
//! Everything the job needs is collected here once, from the command line,
//! and handed to [`crate::core::run_job`]. Nothing is read from or written to
//! process-wide state afterwards.

use std::fmt;
use std::path::PathBuf;

use super::OutputFormat;
use crate::fs::ToolSettings;

/// Default list delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Report label handed to the tool.
pub const REPORT_LABEL: &str = "my_analysis";

/// Everything a single job run needs.
#[derive(Debug, Clone, Default)]
pub struct JobConfig {
    /// Directory the job runs in; results end up here.
    pub job_dir: PathBuf,
    /// Chip platform file the gene sets are converted to.
    pub chip_platform: Option<String>,
    /// File listing the gene set database files, one per line.
    pub gene_set_databases: Option<String>,
    pub output_format: OutputFormat,
    /// Passed through to the tool without validation.
    pub show_etiology: Option<String>,
    /// Delimited selection tokens.
    pub selected_gene_sets: Option<String>,
    /// Replacement for the default `,` delimiter.
    pub alt_delim: Option<String>,
    pub create_zip: bool,
    pub dev_mode: bool,
    pub tool: ToolSettings,
}

/// Returns the value unless it is missing or whitespace only.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Interprets a string-valued flag: only a case-insensitive `true` is true.
#[must_use]
pub fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Single-character separator for selection tokens and the joined selector list.
///
/// The character is matched literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(char);

impl Default for Delimiter {
    fn default() -> Self {
        Self(DEFAULT_DELIMITER)
    }
}

impl Delimiter {
    /// Accepts exactly one character.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Self(c)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    /// Splits `value` on the delimiter.
    ///
    /// Empty pieces at the end are dropped; leading and interior ones are
    /// kept. A value made only of delimiters yields nothing.
    pub fn split(self, value: &str) -> impl Iterator<Item = &str> {
        let trimmed = value.trim_end_matches(self.0);
        (!trimmed.is_empty())
            .then(|| trimmed.split(self.0))
            .into_iter()
            .flatten()
    }

    #[must_use]
    pub fn join<S: AsRef<str>>(self, items: &[S]) -> String {
        let mut buf = [0; 4];
        let separator = self.0.encode_utf8(&mut buf);
        items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(separator)
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JVM system properties the analysis tool is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProperties {
    entries: Vec<(&'static str, &'static str)>,
}

impl ToolProperties {
    /// Properties for a normal or a developer run.
    ///
    /// Debug output and the tool's own directory creation are always off.
    /// Developer runs skip the update check; normal runs tag it as coming
    /// from the hosted modules.
    #[must_use]
    pub fn for_mode(dev_mode: bool) -> Self {
        let mut entries = vec![("debug", "false"), ("mkdir", "false")];
        if dev_mode {
            entries.push(("DMAKE_GSEA_UPDATE_CHECK", "false"));
        } else {
            entries.push(("DMAKE_GSEA_UPDATE_CHECK", "true"));
            entries.push(("UPDATE_CHECK_EXTRA_PROJECT_INFO", "GP_MODULES"));
        }
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[(&'static str, &'static str)] {
        &self.entries
    }

    /// Renders the properties as `-Dkey=value` options, appended to `existing`.
    #[must_use]
    pub fn java_options(&self, existing: Option<&str>) -> String {
        let mut options: Vec<String> = existing
            .filter(|e| !e.trim().is_empty())
            .map(|e| vec![e.trim().to_string()])
            .unwrap_or_default();
        options.extend(self.entries.iter().map(|(k, v)| format!("-D{k}={v}")));
        options.join(" ")
    }
}
