use crate::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project settings file expected at the project root.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Project-level documentation settings.
///
/// Loaded from a `settings.toml` at the project root. Every field has a
/// default, and [`DocConfig::load_or_default`] never fails: a missing or
/// malformed settings file degrades to the defaults rather than aborting
/// documentation rendering. In particular `monospace_docstrings` is `false`
/// whenever it cannot be read.
///
/// # Examples
///
/// ```
/// use nbverbose::DocConfig;
/// use std::path::Path;
///
/// // No settings file in an empty directory: defaults apply.
/// let config = DocConfig::load_or_default(Path::new("/nonexistent"));
/// assert!(!config.monospace_docstrings);
/// assert_eq!(config.nbs_path, std::path::PathBuf::from("nbs"));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Library name, used as the module prefix in doc links
    pub lib_name: String,

    /// Directory containing the source notebooks, relative to the root
    pub nbs_path: PathBuf,

    /// Directory receiving the generated HTML, relative to the root
    pub doc_path: PathBuf,

    /// Host serving the rendered documentation site
    pub doc_host: String,

    /// Base URL path of the documentation site on `doc_host`
    pub doc_baseurl: String,

    /// Repository URL used to build source links
    pub git_url: String,

    /// Branch name used in source links
    pub branch: String,

    /// Render docstring bodies as literal preformatted blocks
    pub monospace_docstrings: bool,

    /// Project root the settings were loaded from
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            lib_name: String::new(),
            nbs_path: PathBuf::from("nbs"),
            doc_path: PathBuf::from("docs"),
            doc_host: String::new(),
            doc_baseurl: String::from("/"),
            git_url: String::new(),
            branch: String::from("main"),
            monospace_docstrings: false,
            root: PathBuf::from("."),
        }
    }
}

impl DocConfig {
    /// Load the settings file from `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. Use
    /// [`DocConfig::load_or_default`] when a missing or broken settings
    /// file should not stop the caller.
    pub fn load(root: &Path) -> Result<Self> {
        let content = fs::read_to_string(root.join(SETTINGS_FILE))?;
        let mut config: DocConfig = toml::from_str(&content)?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Load the settings file from `root`, falling back to defaults on any
    /// failure.
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(root).unwrap_or_else(|_| Self {
            root: root.to_path_buf(),
            ..Self::default()
        })
    }

    /// Absolute path of the notebooks directory.
    pub fn nbs_dir(&self) -> PathBuf {
        self.root.join(&self.nbs_path)
    }

    /// Absolute path of the HTML output directory.
    pub fn doc_dir(&self) -> PathBuf {
        self.root.join(&self.doc_path)
    }

    /// Base URL of the documentation site, host and base path joined.
    pub fn doc_base(&self) -> String {
        format!(
            "{}/{}",
            self.doc_host.trim_end_matches('/'),
            self.doc_baseurl.trim_matches('/')
        )
    }
}
