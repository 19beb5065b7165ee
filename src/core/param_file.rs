//! The tool's parameter file: `name<TAB>value` entries separated by blank lines.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::config::REPORT_LABEL;
use super::params::JobParameters;

/// One line of the parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    pub name: &'static str,
    pub value: String,
}

impl ParamEntry {
    fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Lists the parameter file entries in the order the tool expects.
#[must_use]
pub fn param_entries(params: &JobParameters, out_dir: &Path) -> Vec<ParamEntry> {
    let mut entries = vec![
        ParamEntry::new("gmx", params.gene_sets.as_str()),
        ParamEntry::new("chip_target", params.chip_target.as_str()),
        ParamEntry::new("out", out_dir.to_string_lossy()),
        ParamEntry::new("rpt_label", REPORT_LABEL),
        ParamEntry::new("genesetmatrix_format", params.output_format.tool_token()),
        ParamEntry::new("zip_report", params.create_zip.to_string()),
    ];

    if let Some(delim) = params.alt_delim {
        entries.push(ParamEntry::new("altDelim", delim.to_string()));
    }
    if let Some(show_etiology) = &params.show_etiology {
        entries.push(ParamEntry::new("show_etiology", show_etiology.as_str()));
    }

    entries.push(ParamEntry::new("gui", "false"));
    entries
}

/// Writes the parameter file for `params`, logging each entry.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_param_file(path: &Path, params: &JobParameters, out_dir: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Error creating parameter file {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    info!("Parameters passing to Chip2Chip:");
    for entry in param_entries(params, out_dir) {
        info!("{}\t{}", entry.name, entry.value);
        write!(writer, "{}\t{}\n\n", entry.name, entry.value)
            .with_context(|| format!("Error writing parameter file {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Error writing parameter file {}", path.display()))
}
