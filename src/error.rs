use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for the nbverbose library.
///
/// These cover the pipeline edges only (file I/O, notebook payloads,
/// settings, export, execution). The documentation-formatting core never
/// fails: absent metadata renders as an omitted section and configuration
/// lookup failures degrade to defaults.
///
/// # Examples
///
/// ```
/// use nbverbose::Error;
/// use std::path::PathBuf;
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let error = Error::Io(io_err);
/// assert!(matches!(error, Error::Io(_)));
///
/// let error = Error::NotebookNotFound(PathBuf::from("missing.ipynb"));
/// assert!(matches!(error, Error::NotebookNotFound(_)));
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed notebook JSON payload
    #[error("Notebook error: {0}")]
    Notebook(#[from] serde_json::Error),

    /// Malformed settings file
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// Notebook file not found
    #[error("Notebook not found: {0}")]
    NotebookNotFound(PathBuf),

    /// Directory not found error
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTML export failure for a single notebook
    #[error("Export error: {0}")]
    Export(String),

    /// Notebook execution failure reported by the executor
    #[error("Execution error: {0}")]
    Execution(String),
}

/// Result type alias for nbverbose operations.
///
/// # Examples
///
/// ```
/// use nbverbose::{Result, Error};
/// use std::path::PathBuf;
///
/// fn example_operation() -> Result<String> {
///     Err(Error::NotebookNotFound(PathBuf::from("missing.ipynb")))
/// }
///
/// match example_operation() {
///     Ok(content) => println!("Success: {}", content),
///     Err(e) => println!("Operation failed: {}", e),
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
