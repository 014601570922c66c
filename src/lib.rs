//! # nbverbose
//!
//! `nbverbose` is a documentation generator for notebook-driven projects. It
//! converts computational notebooks into HTML documentation pages and renders
//! verbose API documentation (parameter names, types, defaults, and
//! per-parameter descriptions) for functions, classes, and enumerations.
//!
//! ## Features
//!
//! - **Verbose API docs**: Per-parameter metadata ([`ParamDescriptor`]) is
//!   assembled into Markdown fragments with parameter and return sections
//! - **Closed element classification**: Functions, classes, enumerations,
//!   and opaque objects each get their own head formatting
//! - **Injected collaborators**: Source links, doc links, cross-reference
//!   injection, Markdown rendering, and display are all swappable traits
//! - **Incremental site builds**: Only notebooks newer than their HTML
//!   output are reconverted, fanned out across a worker pool
//!
//! ## Quick Start
//!
//! ```rust
//! use nbverbose::{Docments, DocConfig, Element, ParamDescriptor, ShowDoc, ShowDocOptions};
//!
//! // Describe an element with metadata captured ahead of time.
//! let elt = Element::function(
//!     "mylib.core.retry",
//!     Docments::new()
//!         .param(
//!             "times",
//!             ParamDescriptor::new()
//!                 .with_annotation("int")
//!                 .with_default("3")
//!                 .with_docment("how many attempts to make"),
//!         )
//!         .returns(ParamDescriptor::new().with_annotation("bool")),
//! )
//! .with_docstring("Retry a flaky call.");
//!
//! // Assemble the documentation block as Markdown text.
//! let show = ShowDoc::new(DocConfig::default());
//! let md = show.show_doc(&elt, &ShowDocOptions::default());
//!
//! assert!(md.contains("**Parameters:**"));
//! assert!(md.contains("**`times`** : *`int`*, *optional*"));
//! assert!(md.contains("**Returns**:"));
//! ```
//!
//! ## Building a documentation site
//!
//! ```rust,no_run
//! use nbverbose::{BuildConfig, Builder, DocBuilder, DocConfig};
//! use std::path::Path;
//!
//! fn main() -> nbverbose::Result<()> {
//!     let config = DocConfig::load_or_default(Path::new("."));
//!     let builder = DocBuilder::new(config);
//!     let report = builder.build(&BuildConfig::default())?;
//!     println!("converted {} notebooks", report.converted.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The formatting core never fails: absent metadata renders as an omitted
//! section, and configuration lookups degrade to defaults. The crate's
//! [`Result`] type surfaces only pipeline-edge failures (I/O, malformed
//! notebooks, export errors), and even those are isolated per notebook
//! during a site build.

mod builder;
mod config;
mod error;
pub mod notebook;
pub mod render;
mod showdoc;

use std::path::PathBuf;

pub use builder::DocBuilder;
pub use config::{DocConfig, SETTINGS_FILE};
pub use error::{Error, Result};
pub use showdoc::*;

/// Options for one documentation-site build.
///
/// # Examples
///
/// ```
/// use nbverbose::BuildConfig;
///
/// // Convert everything that changed, half-second pause between tasks.
/// let config = BuildConfig::default();
/// assert!(config.fname.is_none());
/// assert!(!config.force_all);
/// assert_eq!(config.pause, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Notebook name or glob to convert; all notebooks when `None`
    pub fname: Option<String>,

    /// Rebuild even notebooks whose output is up to date
    pub force_all: bool,

    /// Worker count; the pool picks its own default when `None`
    pub n_workers: Option<usize>,

    /// Pause budget (in seconds) spread between tasks to avoid
    /// file-system races
    pub pause: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fname: None,
            force_all: false,
            n_workers: None,
            pause: 0.5,
        }
    }
}

/// Outcome of a documentation-site build.
///
/// Failures are reported here rather than raised: deciding whether a
/// partially failed run should fail the overall process is left to the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Notebooks converted successfully
    pub converted: Vec<PathBuf>,

    /// Notebooks whose conversion failed
    pub failed: Vec<PathBuf>,

    /// Notebooks skipped because their output was up to date
    pub skipped: Vec<PathBuf>,
}

impl BuildReport {
    /// Whether every attempted conversion succeeded.
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Trait to build HTML documentation for a notebook project.
///
/// # Examples
///
/// ```
/// use nbverbose::{BuildConfig, BuildReport, Builder, Result};
///
/// struct NoopBuilder;
///
/// impl Builder for NoopBuilder {
///     fn build(&self, _config: &BuildConfig) -> Result<BuildReport> {
///         Ok(BuildReport::default())
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let report = NoopBuilder.build(&BuildConfig::default())?;
/// assert!(report.all_passed());
/// # Ok(())
/// # }
/// ```
pub trait Builder {
    /// Convert the project's stale notebooks according to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the build cannot start at all (missing
    /// notebooks directory, invalid worker configuration). Per-notebook
    /// conversion failures land in [`BuildReport::failed`] instead.
    fn build(&self, config: &BuildConfig) -> Result<BuildReport>;
}
