//! Error handling for the cookiecutter application.
//! Defines the failure taxonomy used throughout the generation pipeline.

use std::io;
use thiserror::Error;

/// All errors that can occur while materializing a project from a template.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The variable-definition file could not be decoded
    #[error("JSON decoding error while loading '{context_file}'. Error details: {message}.")]
    ContextDecodingError { context_file: String, message: String },

    /// The rendered output directory already exists
    #[error("'{output_dir}' directory already exists.")]
    OutputDirExistsError { output_dir: String },

    /// A template referenced a variable that is not defined in the context
    #[error("{message}")]
    UndefinedVariableError { message: String },

    /// The template source text itself is malformed
    #[error("Syntax error in '{name}' at line {line}: {message}.")]
    TemplateSyntaxError { name: String, line: usize, message: String },

    /// A lifecycle hook script did not run to completion
    #[error("Hook script failed ({message}).")]
    FailedHookError { message: String },

    /// No directory containing a variable-definition file was found
    #[error("A valid template directory could not be found in '{directory}'.")]
    NoTemplateFoundError { directory: String },

    /// The requested version control system is not available
    #[error("'{vcs}' is not installed.")]
    VcsNotInstalledError { vcs: String },

    /// The repository pointed to by the template source does not exist
    #[error("The repository '{template}' could not be found, have you made a typo?")]
    RepositoryNotFoundError { template: String },

    /// The repository exists but cloning or checking out failed
    #[error("Failed to clone repository '{template}': {message}.")]
    RepositoryCloneFailedError { template: String, message: String },

    /// The template source is an archive that cannot be used
    #[error("Invalid archive '{archive}': {message}.")]
    InvalidArchiveError { archive: String, message: String },

    /// A name in the context's extension list is not a known extension
    #[error("Unknown template extension '{name}'.")]
    UnknownExtensionError { name: String },

    /// The replay file is missing required content
    #[error("Replay error: {0}.")]
    ReplayError(String),

    /// The user configuration file is missing or malformed
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents template engine failures with no finer classification
    #[error("Template error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors coming from libgit2 with no finer classification
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),
}

/// Convenience type alias for Results with this crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints a one-line `Error: <message>` to stderr and exits with status 1.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
