//! Job parameter checking.
//!
//! Every check runs even after an earlier one failed, so that a user sees
//! all of the problems with their job in one go instead of fixing them one
//! submission at a time.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::error;

use super::config::{Delimiter, JobConfig, non_blank};
use super::selector::{self, SelectionError};
use super::OutputFormat;
use crate::fs::{JobPaths, read_database_list, stage_input};

/// A single problem with the job parameters.
#[derive(Debug, Error)]
pub enum ParamProblem {
    #[error("Required parameter 'chip.platform.file' not found")]
    MissingChipPlatform,

    #[error(
        "No gene set database files were specified; please provide one or more values to the \
         'gene.sets.database' parameter"
    )]
    MissingGeneSetDatabases,

    #[error("Could not read the gene set database list: {0}")]
    DatabaseListUnreadable(String),

    #[error("Could not stage input file '{file}': {reason}")]
    StagingFailed { file: String, reason: String },

    #[error(
        "Invalid alt.delim '{0}' specified; this must be only a single character and no whitespace"
    )]
    InvalidDelimiter(String),

    #[error("There was a problem processing the 'selected.gene.sets' parameter: {0}")]
    Selection(#[from] SelectionError),
}

/// All problems found in one pass over the parameters. Never empty.
#[derive(Debug)]
pub struct ParameterErrors(Vec<ParamProblem>);

impl ParameterErrors {
    #[must_use]
    pub fn problems(&self) -> &[ParamProblem] {
        &self.0
    }
}

impl fmt::Display for ParameterErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "There were {} error(s) with the job parameters",
            self.0.len()
        )
    }
}

impl std::error::Error for ParameterErrors {}

/// Checked parameters, ready to be written to the tool's parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
    /// Delimited selectors, or delimited database paths when nothing was selected.
    pub gene_sets: String,
    /// Staged chip platform file.
    pub chip_target: String,
    pub output_format: OutputFormat,
    pub create_zip: bool,
    /// Set only when the user supplied a valid alternate delimiter.
    pub alt_delim: Option<Delimiter>,
    pub show_etiology: Option<String>,
}

#[derive(Default)]
struct Problems(Vec<ParamProblem>);

impl Problems {
    fn push(&mut self, problem: ParamProblem) {
        error!("{problem}");
        self.0.push(problem);
    }
}

/// Checks the job parameters and stages input files into the working directory.
///
/// # Errors
///
/// Returns every problem found; see [`ParamProblem`].
pub fn check_parameters(
    config: &JobConfig,
    paths: &JobPaths,
) -> Result<JobParameters, ParameterErrors> {
    let mut problems = Problems::default();
    let working_dir = paths.working_dir();

    let chip_target = match non_blank(config.chip_platform.as_deref()) {
        Some(chip) => stage_or_keep(chip, &working_dir, &mut problems),
        None => {
            problems.push(ParamProblem::MissingChipPlatform);
            String::new()
        }
    };

    let databases: Vec<String> = match non_blank(config.gene_set_databases.as_deref()) {
        Some(list) => match read_database_list(Path::new(list)) {
            Ok(entries) => entries
                .iter()
                .map(|db| stage_or_keep(db, &working_dir, &mut problems))
                .collect(),
            Err(e) => {
                problems.push(ParamProblem::DatabaseListUnreadable(format!("{e:#}")));
                Vec::new()
            }
        },
        None => {
            problems.push(ParamProblem::MissingGeneSetDatabases);
            Vec::new()
        }
    };

    let alt_delim = match non_blank(config.alt_delim.as_deref()) {
        Some(value) => {
            let parsed = Delimiter::parse(value);
            if parsed.is_none() {
                problems.push(ParamProblem::InvalidDelimiter(value.to_string()));
            }
            parsed
        }
        None => None,
    };
    let delimiter = alt_delim.unwrap_or_default();

    let tokens: Vec<&str> = non_blank(config.selected_gene_sets.as_deref())
        .map(|selected| delimiter.split(selected).collect())
        .unwrap_or_default();

    // No selection means every gene set of every file.
    let gene_sets = if tokens.is_empty() {
        delimiter.join(&databases)
    } else {
        match selector::resolve(&databases, &tokens) {
            Ok(selectors) => delimiter.join(&selectors),
            Err(e) => {
                problems.push(e.into());
                String::new()
            }
        }
    };

    if !problems.0.is_empty() {
        return Err(ParameterErrors(problems.0));
    }

    Ok(JobParameters {
        gene_sets,
        chip_target,
        output_format: config.output_format,
        create_zip: config.create_zip,
        alt_delim,
        show_etiology: config.show_etiology.clone(),
    })
}

/// Stages `file`, recording a problem and falling back to the original
/// path so later checks still see a value.
fn stage_or_keep(file: &str, working_dir: &Path, problems: &mut Problems) -> String {
    match stage_input(file, working_dir) {
        Ok(staged) => staged,
        Err(e) => {
            problems.push(ParamProblem::StagingFailed {
                file: file.to_string(),
                reason: format!("{e:#}"),
            });
            file.to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        paths: JobPaths,
        uploads: std::path::PathBuf,
    }

    impl Fixture {
        fn new() -> Result<Self> {
            let temp = TempDir::new()?;
            let paths = JobPaths::new(&temp.path().join("job"));
            paths.ensure_analysis_dir()?;
            let uploads = temp.path().join("uploads");
            std::fs::create_dir(&uploads)?;
            Ok(Self {
                _temp: temp,
                paths,
                uploads,
            })
        }

        fn upload(&self, name: &str) -> Result<String> {
            let path = self.uploads.join(name);
            std::fs::write(&path, "content")?;
            Ok(path.to_string_lossy().into_owned())
        }

        fn database_list(&self, entries: &[&str]) -> Result<String> {
            let path = self.uploads.join("gmx.list.txt");
            std::fs::write(&path, entries.join("\n"))?;
            Ok(path.to_string_lossy().into_owned())
        }

        fn config(&self, chip: &str, list: &str) -> JobConfig {
            JobConfig {
                job_dir: self.paths.job_dir().to_path_buf(),
                chip_platform: Some(chip.to_string()),
                gene_set_databases: Some(list.to_string()),
                ..JobConfig::default()
            }
        }
    }

    mod success_tests {
        use super::*;

        /// Without selections every database file is used, joined with commas.
        #[test]
        fn no_selection_uses_all_databases() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt", "/d2/b.gmt"])?;

            let params = check_parameters(&fx.config(&chip, &list), &fx.paths).unwrap();

            assert_eq!(params.gene_sets, "/d1/a.gmt,/d2/b.gmt");
            assert_eq!(params.chip_target, chip);
            assert_eq!(params.output_format, OutputFormat::Gmt);
            assert_eq!(params.alt_delim, None);
            Ok(())
        }

        #[test]
        fn selections_are_resolved_and_joined() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt", "/d2/b.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("b.gmt#P2,a.gmt#P1".to_string()),
                ..fx.config(&chip, &list)
            };

            let params = check_parameters(&config, &fx.paths).unwrap();
            assert_eq!(params.gene_sets, "/d2/b.gmt#P2,/d1/a.gmt#P1");
            Ok(())
        }

        #[test]
        fn alternate_delimiter_splits_and_joins() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("SET,WITH,COMMAS;OTHER".to_string()),
                alt_delim: Some(";".to_string()),
                ..fx.config(&chip, &list)
            };

            let params = check_parameters(&config, &fx.paths).unwrap();
            assert_eq!(params.gene_sets, "/d1/a.gmt#SET,WITH,COMMAS;/d1/a.gmt#OTHER");
            assert_eq!(params.alt_delim, Delimiter::parse(";"));
            Ok(())
        }

        /// A trailing delimiter adds no selection.
        #[test]
        fn trailing_delimiter_is_ignored() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt", "/d2/b.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("a.gmt#P1,b.gmt#P2,,".to_string()),
                ..fx.config(&chip, &list)
            };

            let params = check_parameters(&config, &fx.paths).unwrap();
            assert_eq!(params.gene_sets, "/d1/a.gmt#P1,/d2/b.gmt#P2");
            Ok(())
        }

        /// With one file an empty selection still names that file's gene set.
        #[test]
        fn empty_selection_with_single_file_passes_through() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("P1,,P2".to_string()),
                ..fx.config(&chip, &list)
            };

            let params = check_parameters(&config, &fx.paths).unwrap();
            assert_eq!(params.gene_sets, "/d1/a.gmt#P1,/d1/a.gmt#,/d1/a.gmt#P2");
            Ok(())
        }

        /// Reserved characters in uploaded names are staged into the working dir.
        #[test]
        fn inputs_with_reserved_chars_are_staged() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("chip@v1.chip")?;
            let db = fx.upload("my#sets.gmt")?;
            let list = fx.database_list(&[db.as_str()])?;
            let config = JobConfig {
                selected_gene_sets: Some("my_sets.gmt#P1".to_string()),
                ..fx.config(&chip, &list)
            };

            let params = check_parameters(&config, &fx.paths).unwrap();

            let working = fx.paths.working_dir();
            assert_eq!(
                params.chip_target,
                working.join("chip_v1.chip").to_string_lossy()
            );
            assert_eq!(
                params.gene_sets,
                format!("{}#P1", working.join("my_sets.gmt").display())
            );
            Ok(())
        }
    }

    mod failure_tests {
        use super::*;

        fn kinds(errors: &ParameterErrors) -> Vec<&'static str> {
            errors
                .problems()
                .iter()
                .map(|problem| match problem {
                    ParamProblem::MissingChipPlatform => "MissingChipPlatform",
                    ParamProblem::MissingGeneSetDatabases => "MissingGeneSetDatabases",
                    ParamProblem::DatabaseListUnreadable(_) => "DatabaseListUnreadable",
                    ParamProblem::StagingFailed { .. } => "StagingFailed",
                    ParamProblem::InvalidDelimiter(_) => "InvalidDelimiter",
                    ParamProblem::Selection(_) => "Selection",
                })
                .collect()
        }

        /// Unrelated problems are all reported together.
        #[test]
        fn problems_accumulate() -> Result<()> {
            let fx = Fixture::new()?;
            let list = fx.database_list(&["/d1/a.gmt", "/d2/b.gmt"])?;
            let config = JobConfig {
                chip_platform: None,
                selected_gene_sets: Some("P1".to_string()),
                alt_delim: Some(";;".to_string()),
                ..fx.config("", &list)
            };

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert_eq!(
                kinds(&errors),
                vec!["MissingChipPlatform", "InvalidDelimiter", "Selection"]
            );
            Ok(())
        }

        /// Missing databases are reported once; the selection does not pile on.
        #[test]
        fn missing_databases_suppress_selection_errors() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let config = JobConfig {
                gene_set_databases: Some("   ".to_string()),
                selected_gene_sets: Some("a.gmt#P1#junk".to_string()),
                ..fx.config(&chip, "")
            };

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert_eq!(kinds(&errors), vec!["MissingGeneSetDatabases"]);
            Ok(())
        }

        #[test]
        fn unreadable_list_is_reported() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let config = fx.config(&chip, "/no/such/gmx.list.txt");

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert_eq!(kinds(&errors), vec!["DatabaseListUnreadable"]);
            Ok(())
        }

        /// A failed staging copy keeps the original name for later checks.
        #[test]
        fn staging_failure_keeps_checking() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/gone/a#b.gmt", "/gone/a#b.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("a#b.gmt#P1".to_string()),
                ..fx.config(&chip, &list)
            };

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert_eq!(
                kinds(&errors),
                vec!["StagingFailed", "StagingFailed", "Selection"]
            );
            assert!(matches!(
                errors.problems()[2],
                ParamProblem::Selection(SelectionError::DuplicateFileName { .. })
            ));
            Ok(())
        }

        /// An empty selection between two delimiters has no file part.
        #[test]
        fn empty_selection_with_many_files_is_malformed() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/a.gmt", "/d2/b.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("a.gmt#P1,,b.gmt#P2".to_string()),
                ..fx.config(&chip, &list)
            };

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert!(matches!(
                errors.problems(),
                [ParamProblem::Selection(SelectionError::MalformedToken { token })] if token.is_empty()
            ));
            Ok(())
        }

        #[test]
        fn selection_error_kind_is_preserved() -> Result<()> {
            let fx = Fixture::new()?;
            let chip = fx.upload("HG_U133A.chip")?;
            let list = fx.database_list(&["/d1/sets.gmt"])?;
            let config = JobConfig {
                selected_gene_sets: Some("other.gmt#P1".to_string()),
                ..fx.config(&chip, &list)
            };

            let errors = check_parameters(&config, &fx.paths).unwrap_err();
            assert!(matches!(
                errors.problems(),
                [ParamProblem::Selection(SelectionError::FileMismatch { .. })]
            ));
            assert_eq!(
                errors.to_string(),
                "There were 1 error(s) with the job parameters"
            );
            Ok(())
        }
    }
}
