//! Locating the analysis tool's executable.
//!
//! The tool command comes from the tool settings and is either:
//!
//! 1. A path (anything containing a path separator), used as-is once it is
//!    verified to be an executable file
//! 2. A bare command name, looked up in the directories of `PATH`
//!
//! Bare names are validated with [`is_safe_command_name`] before lookup.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Result of resolving the tool command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResolution {
    /// Executable found; run it via `Command::new(path)`.
    PathExecutable(PathBuf),
    /// Command not found, not executable, or not a safe name.
    NotFound,
}

impl CommandResolution {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PathExecutable(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

/// Validates a bare command name.
///
/// # Rules
/// - Only ASCII alphanumerics, `-`, `_` and `.` allowed
/// - Must not start with `.`
/// - 1 to 64 characters
///
/// # Examples
/// ```
/// use chip2chip::core::cli_check::is_safe_command_name;
///
/// assert!(is_safe_command_name("gsea-cli.sh"));
/// assert!(is_safe_command_name("java"));
/// assert!(!is_safe_command_name(""));
/// assert!(!is_safe_command_name(".."));
/// assert!(!is_safe_command_name("gsea; rm -rf ~"));
/// ```
#[must_use]
pub fn is_safe_command_name(command: &str) -> bool {
    if command.is_empty() || command.len() > 64 || command.starts_with('.') {
        return false;
    }
    command
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Resolves the tool command against the current `PATH`.
#[must_use]
pub fn resolve_tool_command(command: &str) -> CommandResolution {
    resolve_with_search_path(command, std::env::var_os("PATH").as_deref())
}

/// Resolves `command`, searching `search_path` (a `PATH`-style list) for bare names.
#[must_use]
pub fn resolve_with_search_path(command: &str, search_path: Option<&OsStr>) -> CommandResolution {
    if command.contains(['/', '\\']) {
        let path = PathBuf::from(command);
        return if is_executable(&path) {
            CommandResolution::PathExecutable(path)
        } else {
            CommandResolution::NotFound
        };
    }

    if !is_safe_command_name(command) {
        return CommandResolution::NotFound;
    }

    search_path
        .into_iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
        .map_or(CommandResolution::NotFound, CommandResolution::PathExecutable)
}

/// Checks if a path points to an executable file.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        // Must be a regular file with execute permission
        Ok(metadata) => metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0),
        Err(_) => false,
    }
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext_lower = ext.to_lowercase();
            matches!(ext_lower.as_str(), "exe" | "cmd" | "bat" | "com" | "ps1")
        })
}
