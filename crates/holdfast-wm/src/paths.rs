//! Home-application path resolution.
//!
//! The path comes from the command line when given, otherwise from a
//! one-line config file (trailing whitespace trimmed). Failing both is a
//! fatal startup error with its own exit code.

use std::{fs, io, path::{Path, PathBuf}};

use thiserror::Error;

/// Why the home application path could not be resolved.
#[derive(Error, Debug)]
pub enum HomePathError {
    /// The config file could not be read and no CLI path was given.
    #[error("cannot read home application file {path}: {source}")]
    Unreadable {
        /// The config file that was tried.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The config file exists but holds no path.
    #[error("home application file {path} is empty")]
    Empty {
        /// The config file that was tried.
        path: PathBuf,
    },
}

/// Resolve the home application executable.
pub fn resolve_home(cli: Option<PathBuf>, file: &Path) -> Result<PathBuf, HomePathError> {
    if let Some(path) = cli {
        tracing::info!(path = %path.display(), "home application from command line");
        return Ok(path);
    }

    let contents = fs::read_to_string(file).map_err(|source| HomePathError::Unreadable {
        path: file.to_path_buf(),
        source,
    })?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(HomePathError::Empty { path: file.to_path_buf() });
    }
    tracing::info!(path = %trimmed, file = %file.display(), "home application from config file");
    Ok(PathBuf::from(trimmed))
}
