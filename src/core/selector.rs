//! Gene set selection resolution.
//!
//! Users pick gene sets with tokens of the form `file_name#gene_set_name`.
//! When exactly one database file was submitted the file part may be left
//! out and the token is just `gene_set_name`. Each accepted token becomes a
//! selector `full/path/to/file#gene_set_name` for the analysis tool, which
//! checks that the gene set actually exists.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

/// Separator between the file name and the gene set name in a token.
pub const SELECTOR_SEPARATOR: char = '#';

/// Errors raised while turning selection tokens into selectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Two database files share the same base name.
    #[error(
        "duplicated file name '{file_name}' found in submitted gene set files; \
         this is not allowed when selecting gene sets"
    )]
    DuplicateFileName { file_name: String },

    /// The token has the wrong number of `#`-separated parts.
    #[error(
        "gene set selection '{token}' is not valid; each selection must be a file name + '#' + \
         gene set name, e.g. my_file1.gmt#selected_gene_set1. The file name may be left out \
         when there is only one gene set file"
    )]
    MalformedToken { token: String },

    /// A qualified token names a file other than the lone submitted file.
    #[error(
        "gene set selection '{token}' is not valid; the file name must match the lone file \
         '{file_name}' supplied as the gene set database"
    )]
    FileMismatch { token: String, file_name: String },

    /// A qualified token names a file that was not submitted.
    #[error("selected file name '{file_name}' not found in submitted gene set files")]
    UnknownFileName { file_name: String },
}

/// A parsed selection token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionToken<'a> {
    /// `gene_set_name`, only usable with a single database file.
    Bare { gene_set: &'a str },
    /// `file_name#gene_set_name`.
    Qualified { file_name: &'a str, gene_set: &'a str },
}

impl<'a> SelectionToken<'a> {
    /// Parses a raw token.
    ///
    /// Trailing empty parts are ignored, so `sets.gmt#` is the bare token
    /// `sets.gmt`. An empty leading part is kept and simply names no file.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::MalformedToken`] when the token does not
    /// have one or two `#`-separated parts.
    pub fn parse(token: &'a str) -> Result<Self, SelectionError> {
        let malformed = || SelectionError::MalformedToken {
            token: token.to_string(),
        };

        let trimmed = token.trim_end_matches(SELECTOR_SEPARATOR);
        // Nothing but `#` leaves no parts at all.
        if trimmed.is_empty() && !token.is_empty() {
            return Err(malformed());
        }

        let mut parts = trimmed.split(SELECTOR_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(gene_set), None, None) => Ok(Self::Bare { gene_set }),
            (Some(file_name), Some(gene_set), None) => Ok(Self::Qualified {
                file_name,
                gene_set,
            }),
            _ => Err(malformed()),
        }
    }

    /// Returns the gene set name carried by the token.
    #[must_use]
    pub const fn gene_set(&self) -> &'a str {
        match self {
            Self::Bare { gene_set } | Self::Qualified { gene_set, .. } => gene_set,
        }
    }
}

/// Returns the final path component, treating both `/` and `\` as separators.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rfind(['/', '\\'])
        .map_or(path, |idx| &path[idx + 1..])
}

/// Resolves selection tokens against the submitted database files.
///
/// Returns one selector per token, in token order. An empty `database_files`
/// yields an empty result without error: the missing databases have already
/// been reported by whoever produced the list.
///
/// Base names must be unique across all database files, whether or not a
/// token refers to them.
///
/// # Errors
///
/// Returns the first [`SelectionError`] encountered.
pub fn resolve<S, T>(database_files: &[S], tokens: &[T]) -> Result<Vec<String>, SelectionError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    if database_files.is_empty() {
        return Ok(Vec::new());
    }

    let by_name = map_base_names(database_files)?;

    if let [only] = database_files {
        let only = only.as_ref();
        tokens
            .iter()
            .map(|token| resolve_single(token.as_ref(), only))
            .collect()
    } else {
        tokens
            .iter()
            .map(|token| resolve_qualified(token.as_ref(), &by_name))
            .collect()
    }
}

fn map_base_names<S: AsRef<str>>(
    database_files: &[S],
) -> Result<HashMap<&str, &str>, SelectionError> {
    let mut by_name = HashMap::with_capacity(database_files.len());
    for path in database_files {
        let path = path.as_ref();
        let name = base_name(path);
        if by_name.insert(name, path).is_some() {
            return Err(SelectionError::DuplicateFileName {
                file_name: name.to_string(),
            });
        }
        debug!(base_name = name, path, "mapped gene set file");
    }
    Ok(by_name)
}

fn resolve_single(token: &str, path: &str) -> Result<String, SelectionError> {
    let file_name = base_name(path);
    match SelectionToken::parse(token)? {
        SelectionToken::Qualified {
            file_name: named, ..
        } if named != file_name => Err(SelectionError::FileMismatch {
            token: token.to_string(),
            file_name: file_name.to_string(),
        }),
        parsed => Ok(selector(path, parsed.gene_set())),
    }
}

fn resolve_qualified(token: &str, by_name: &HashMap<&str, &str>) -> Result<String, SelectionError> {
    match SelectionToken::parse(token)? {
        SelectionToken::Bare { .. } => Err(SelectionError::MalformedToken {
            token: token.to_string(),
        }),
        SelectionToken::Qualified {
            file_name,
            gene_set,
        } => by_name
            .get(file_name)
            .map(|path| selector(path, gene_set))
            .ok_or_else(|| SelectionError::UnknownFileName {
                file_name: file_name.to_string(),
            }),
    }
}

fn selector(path: &str, gene_set: &str) -> String {
    format!("{path}{SELECTOR_SEPARATOR}{gene_set}")
}
