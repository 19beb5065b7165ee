//! Input file staging.
//!
//! The analysis tool treats `#` and `@` in file names as part of its own
//! selector syntax, so uploaded files carrying those characters are copied
//! into the working directory under a sanitized name before use.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::core::selector::base_name;

/// Characters the analysis tool cannot accept in file names.
pub const RESERVED_CHARS: [char; 2] = ['#', '@'];

/// Replacement for reserved characters.
const REPLACEMENT: char = '_';

/// Returns `name` with every reserved character replaced.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.replace(RESERVED_CHARS, &REPLACEMENT.to_string())
}

/// Makes `file` safe to hand to the analysis tool.
///
/// Paths free of reserved characters are returned unchanged. Otherwise the
/// file is copied into `working_dir` under its sanitized base name and the
/// copy's path is returned. Reserved characters in parent directories
/// disappear along with the directories themselves.
///
/// # Errors
///
/// Returns an error if the copy fails.
pub fn stage_input(file: &str, working_dir: &Path) -> Result<String> {
    if !file.contains(RESERVED_CHARS) {
        return Ok(file.to_string());
    }

    let new_name = sanitize_file_name(base_name(file));
    let dest = working_dir.join(&new_name);

    info!("Copying file '{file}' to '{new_name}'");
    std::fs::copy(file, &dest)
        .with_context(|| format!("An error occurred trying to copy '{file}' to '{new_name}'"))?;

    Ok(dest.to_string_lossy().into_owned())
}

/// Reads the gene set database list: one file path per line.
///
/// Blank lines are skipped; other lines are kept verbatim, in order.
///
/// # Errors
///
/// Returns an error if the list file cannot be read.
pub fn read_database_list(list_file: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(list_file).with_context(|| {
        format!(
            "Failed to read gene set database list: {}",
            list_file.display()
        )
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    mod sanitize_tests {
        use super::*;

        #[test]
        fn replaces_hash_and_at() {
            assert_eq!(sanitize_file_name("my#sets@v2.gmt"), "my_sets_v2.gmt");
        }

        #[test]
        fn leaves_clean_names_alone() {
            assert_eq!(sanitize_file_name("sets.gmt"), "sets.gmt");
        }
    }

    mod stage_input_tests {
        use super::*;

        /// Clean paths are used in place, even when they do not exist.
        #[test]
        fn clean_path_is_returned_unchanged() -> Result<()> {
            let working = TempDir::new()?;
            let staged = stage_input("/uploads/sets.gmt", working.path())?;
            assert_eq!(staged, "/uploads/sets.gmt");
            assert_eq!(std::fs::read_dir(working.path())?.count(), 0);
            Ok(())
        }

        #[test]
        fn reserved_chars_trigger_a_sanitized_copy() -> Result<()> {
            let uploads = TempDir::new()?;
            let working = TempDir::new()?;
            let original = uploads.path().join("my#sets@1.gmt");
            std::fs::write(&original, "SET\tdesc\tGENE1\n")?;

            let staged = stage_input(original.to_str().unwrap(), working.path())?;

            let expected = working.path().join("my_sets_1.gmt");
            assert_eq!(staged, expected.to_string_lossy());
            assert_eq!(std::fs::read_to_string(expected)?, "SET\tdesc\tGENE1\n");
            assert!(original.exists());
            Ok(())
        }

        /// Only the base name survives, so a reserved char in a directory is dropped.
        #[test]
        fn reserved_char_in_directory_only() -> Result<()> {
            let uploads = TempDir::new()?;
            let working = TempDir::new()?;
            let dir = uploads.path().join("run#1");
            std::fs::create_dir(&dir)?;
            let original = dir.join("sets.gmt");
            std::fs::write(&original, "x")?;

            let staged = stage_input(original.to_str().unwrap(), working.path())?;
            assert_eq!(staged, working.path().join("sets.gmt").to_string_lossy());
            Ok(())
        }

        #[test]
        fn missing_source_is_an_error() -> Result<()> {
            let working = TempDir::new()?;
            let err = stage_input("/no/such/dir/bad#name.gmt", working.path()).unwrap_err();
            assert!(err.to_string().contains("bad_name.gmt"));
            Ok(())
        }
    }

    mod read_database_list_tests {
        use super::*;

        #[test]
        fn reads_paths_in_order_skipping_blank_lines() -> Result<()> {
            let dir = TempDir::new()?;
            let list = dir.path().join("gmx.list.txt");
            std::fs::write(&list, "/d1/a.gmt\n\n/d2/b.gmt\n   \n")?;

            assert_eq!(
                read_database_list(&list)?,
                vec!["/d1/a.gmt".to_string(), "/d2/b.gmt".to_string()]
            );
            Ok(())
        }

        #[test]
        fn missing_list_is_an_error() {
            assert!(read_database_list(Path::new("/no/such/list.txt")).is_err());
        }
    }
}
