//! Error handling for dj-beat-drop.
//! Defines the error taxonomy and the result type used throughout the application.

use std::path::PathBuf;

use console::style;
use thiserror::Error;

/// Custom error types for scaffolding operations.
///
/// Each variant corresponds to one failure class of the scaffolding pipeline.
/// Nothing is retried; any of these aborts the current invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// The package index could not be queried or answered with a non-success status.
    #[error("Failed to fetch release information from '{url}': {reason}.")]
    Fetch { url: String, reason: String },

    /// Malformed project or app name.
    #[error("Validation error: {0}.")]
    Validation(String),

    /// The user declined to overwrite an existing directory.
    #[error("Operation cancelled: '{}' was left untouched.", .directory.display())]
    Cancelled { directory: PathBuf },

    /// Represents errors that occur during file system operations.
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Directory traversal failure.
    #[error("Failed to walk directory: {0}.")]
    Walk(#[from] walkdir::Error),

    /// An external bootstrap command exited unsuccessfully or could not be spawned.
    #[error("Command '{program}' failed ({status}): {stderr}")]
    CommandFailed { program: String, status: String, stderr: String },

    /// No final release exists on the long-term-support line.
    #[error("No long-term-support release found for the x.{marker} line.")]
    NoLtsRelease { marker: String },

    /// The template directory for the requested identifier is missing.
    #[error("Template '{template_id}' not found in {}. Run `dj-beat-drop update-templates` to fetch it.", .path.display())]
    TemplateNotFound { template_id: String, path: PathBuf },

    /// The generated settings file does not have the expected layout.
    #[error("Cannot patch settings: no top-level '{setting}' assignment found.")]
    SettingsPatch { setting: String },

    /// A version string that does not look like `major.minor[.patch]`.
    #[error("Invalid version string: '{0}'.")]
    InvalidVersion(String),

    /// Framework source archive could not be read or extracted.
    #[error("Archive error: {0}.")]
    Archive(String),

    /// Interactive prompt failure (e.g. no terminal attached).
    #[error("Prompt error: {0}.")]
    Prompt(#[from] dialoguer::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Cancellation is reported in red without the error prefix; every error
/// terminates the process with status code 1.
pub fn default_error_handler(err: Error) {
    match err {
        Error::Cancelled { .. } => eprintln!("{}", style("Operation cancelled.").red()),
        _ => eprintln!("{}", style(err).red()),
    }
    std::process::exit(1);
}
