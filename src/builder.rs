use crate::notebook::{
    self, BasicHtmlExporter, Exporter, NotebookExecutor, NullExecutor, read_notebook,
};
use crate::{BuildConfig, BuildReport, Builder, DocConfig, Error, Result};
use ignore::Walk;
use rayon::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Fixed timeout handed to the notebook executor, per notebook.
const EXECUTION_TIMEOUT: Duration = Duration::from_secs(600);

/// The documentation builder implementation.
///
/// Globs the project's notebooks, decides which are stale, converts each
/// one to an HTML page through the executor and exporter collaborators,
/// and fans the conversions out across a worker pool. A failure in one
/// notebook never aborts the others; it is logged and reported in the
/// [`BuildReport`].
pub struct DocBuilder {
    config: DocConfig,
    executor: Box<dyn NotebookExecutor>,
    exporter: Box<dyn Exporter>,
}

impl DocBuilder {
    /// Create a builder with the default collaborators: a no-op executor
    /// and the built-in HTML exporter.
    pub fn new(config: DocConfig) -> Self {
        Self {
            config,
            executor: Box::new(NullExecutor),
            exporter: Box::new(BasicHtmlExporter::new()),
        }
    }

    /// Swap the notebook execution engine.
    pub fn with_executor(mut self, executor: Box<dyn NotebookExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Swap the HTML exporter.
    pub fn with_exporter(mut self, exporter: Box<dyn Exporter>) -> Self {
        self.exporter = exporter;
        self
    }

    /// The loaded project settings.
    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    /// Collect the notebooks to consider, sorted by path.
    ///
    /// Skips names starting with `_` and applies the optional glob filter
    /// against file names.
    fn glob_notebooks(&self, filter: Option<&str>) -> Result<Vec<PathBuf>> {
        let dir = self.config.nbs_dir();
        if !dir.exists() {
            return Err(Error::DirectoryNotFound(dir));
        }
        let filter_re = filter.map(glob_to_regex).transpose()?;
        let mut files = Vec::new();
        for entry in Walk::new(&dir).filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(OsStr::to_str) != Some("ipynb") {
                continue;
            }
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if name.starts_with('_') {
                continue;
            }
            if let Some(re) = &filter_re {
                if !re.is_match(name) {
                    continue;
                }
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    /// Deterministic output path for a notebook.
    pub fn output_path(&self, fname: &Path) -> PathBuf {
        let stem = fname
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("notebook");
        self.config.doc_dir().join(format!("{stem}.html"))
    }

    /// A notebook is stale when its output is missing or older than the
    /// source. Metadata errors count as stale.
    fn needs_rebuild(&self, fname: &Path) -> bool {
        let out = self.output_path(fname);
        let Ok(out_meta) = fs::metadata(&out) else {
            return true;
        };
        let Ok(src_meta) = fs::metadata(fname) else {
            return true;
        };
        match (src_meta.modified(), out_meta.modified()) {
            (Ok(src), Ok(out)) => src >= out,
            _ => true,
        }
    }

    /// Convert one notebook to its HTML page.
    pub fn convert_notebook(&self, fname: &Path) -> Result<()> {
        let mut nb = read_notebook(fname)?;
        notebook::process_cells(&mut nb);
        self.executor.execute(&mut nb, EXECUTION_TIMEOUT)?;
        let html = self.exporter.export(&nb)?;
        let out = self.output_path(fname);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out, html)?;
        Ok(())
    }

    /// Per-task wrapper: jitter, convert, catch.
    fn convert_guarded(&self, fname: &Path, pause: f64) -> bool {
        // Desynchronizes simultaneous file-system access across workers.
        let jitter = pause * rand::random::<f64>();
        if jitter > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(jitter));
        }
        info!("converting: {}", fname.display());
        match self.convert_notebook(fname) {
            Ok(()) => true,
            Err(e) => {
                warn!("conversion of {} failed: {}", fname.display(), e);
                false
            }
        }
    }

    /// Write `sidebar.json` into the docs directory, mapping each
    /// notebook's title (first level-one heading, falling back to the
    /// file stem) to its HTML page.
    pub fn make_sidebar(&self) -> Result<()> {
        let files = self.glob_notebooks(None)?;
        let mut entries = serde_json::Map::new();
        for fname in &files {
            let stem = fname
                .file_stem()
                .and_then(OsStr::to_str)
                .unwrap_or("notebook");
            let title = notebook_title(fname).unwrap_or_else(|| stem.to_string());
            entries.insert(title, Value::String(format!("{stem}.html")));
        }
        fs::create_dir_all(self.config.doc_dir())?;
        fs::write(
            self.config.doc_dir().join("sidebar.json"),
            serde_json::to_string_pretty(&Value::Object(entries))?,
        )?;
        Ok(())
    }

    /// Regenerate `README.md` at the project root from the markdown cells
    /// of `index.ipynb`. A missing index notebook is not an error.
    pub fn make_readme(&self) -> Result<()> {
        let index = self.config.nbs_dir().join("index.ipynb");
        if !index.exists() {
            return Ok(());
        }
        let nb = read_notebook(&index)?;
        let sections: Vec<String> = nb
            .cells
            .iter()
            .filter(|cell| cell.is_markdown())
            .map(|cell| cell.text())
            .collect();
        fs::write(
            self.config.root.join("README.md"),
            sections.join("\n\n") + "\n",
        )?;
        Ok(())
    }
}

impl Builder for DocBuilder {
    fn build(&self, config: &BuildConfig) -> Result<BuildReport> {
        let mut files = self.glob_notebooks(config.fname.as_deref())?;
        let mut force_all = config.force_all;
        let mut n_workers = config.n_workers;
        if files.len() == 1 {
            force_all = true;
            n_workers = Some(1);
        }

        let mut skipped = Vec::new();
        if !force_all {
            let (stale, fresh): (Vec<_>, Vec<_>) =
                files.into_iter().partition(|f| self.needs_rebuild(f));
            files = stale;
            skipped = fresh;
        }
        if files.is_empty() {
            info!("no notebooks were modified");
            return Ok(BuildReport {
                converted: Vec::new(),
                failed: Vec::new(),
                skipped,
            });
        }

        let pause = config.pause;
        let convert_all = || -> Vec<(PathBuf, bool)> {
            files
                .par_iter()
                .map(|fname| (fname.clone(), self.convert_guarded(fname, pause)))
                .collect()
        };
        let results = match n_workers {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| Error::InvalidConfig(e.to_string()))?
                .install(convert_all),
            None => convert_all(),
        };

        let (converted, failed): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|(_, passed)| *passed);
        Ok(BuildReport {
            converted: converted.into_iter().map(|(f, _)| f).collect(),
            failed: failed.into_iter().map(|(f, _)| f).collect(),
            skipped,
        })
    }
}

/// Title of a notebook: its first level-one markdown heading.
fn notebook_title(fname: &Path) -> Option<String> {
    let nb = read_notebook(fname).ok()?;
    nb.cells
        .iter()
        .filter(|cell| cell.is_markdown())
        .find_map(|cell| {
            cell.text().lines().find_map(|line| {
                line.trim()
                    .strip_prefix("# ")
                    .map(|title| title.trim().to_string())
            })
        })
}

/// Compile a shell-style glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            ch => regex.push_str(&regex::escape(&ch.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex)
        .map_err(|e| Error::InvalidConfig(format!("bad notebook glob {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_notebook(title: &str) -> String {
        format!(
            r##"{{"cells": [{{"cell_type": "markdown", "metadata": {{}}, "source": "# {title}"}}], "metadata": {{}}, "nbformat": 4, "nbformat_minor": 5}}"##
        )
    }

    fn project() -> (tempfile::TempDir, DocBuilder) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nbs")).unwrap();
        let config = DocConfig::load_or_default(dir.path());
        (dir, DocBuilder::new(config))
    }

    fn build_config() -> BuildConfig {
        BuildConfig {
            pause: 0.0,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_build_converts_all_notebooks() {
        let (dir, builder) = project();
        fs::write(
            dir.path().join("nbs/00_core.ipynb"),
            minimal_notebook("Core"),
        )
        .unwrap();
        fs::write(
            dir.path().join("nbs/01_extra.ipynb"),
            minimal_notebook("Extra"),
        )
        .unwrap();
        // Underscore-prefixed notebooks are never picked up.
        fs::write(
            dir.path().join("nbs/_scratch.ipynb"),
            minimal_notebook("Scratch"),
        )
        .unwrap();

        let report = builder.build(&build_config()).unwrap();
        assert_eq!(report.converted.len(), 2);
        assert!(report.failed.is_empty());
        assert!(dir.path().join("docs/00_core.html").exists());
        assert!(dir.path().join("docs/01_extra.html").exists());
        assert!(!dir.path().join("docs/_scratch.html").exists());

        let html = fs::read_to_string(dir.path().join("docs/00_core.html")).unwrap();
        assert!(html.contains("<h1>Core</h1>"));
    }

    #[test]
    fn test_unmodified_notebooks_are_skipped() {
        let (dir, builder) = project();
        fs::write(
            dir.path().join("nbs/00_core.ipynb"),
            minimal_notebook("Core"),
        )
        .unwrap();
        fs::write(
            dir.path().join("nbs/01_extra.ipynb"),
            minimal_notebook("Extra"),
        )
        .unwrap();

        let first = builder.build(&build_config()).unwrap();
        assert_eq!(first.converted.len(), 2);

        // Backdate both sources so the outputs are strictly newer.
        // (mtime granularity can otherwise make src == out, which counts
        // as stale.)
        let old = std::time::SystemTime::now() - Duration::from_secs(60);
        for name in ["nbs/00_core.ipynb", "nbs/01_extra.ipynb"] {
            let file = fs::File::options()
                .append(true)
                .open(dir.path().join(name))
                .unwrap();
            file.set_modified(old).unwrap();
        }

        let second = builder.build(&build_config()).unwrap();
        assert!(second.converted.is_empty());
        assert_eq!(second.skipped.len(), 2);

        let third = builder
            .build(&BuildConfig {
                force_all: true,
                pause: 0.0,
                ..BuildConfig::default()
            })
            .unwrap();
        assert_eq!(third.converted.len(), 2);
    }

    #[test]
    fn test_single_match_forces_rebuild() {
        let (dir, builder) = project();
        fs::write(
            dir.path().join("nbs/00_core.ipynb"),
            minimal_notebook("Core"),
        )
        .unwrap();

        // Fresh output, but a single-notebook selection rebuilds anyway.
        builder.build(&build_config()).unwrap();
        let report = builder
            .build(&BuildConfig {
                fname: Some("00_core.ipynb".to_string()),
                pause: 0.0,
                ..BuildConfig::default()
            })
            .unwrap();
        assert_eq!(report.converted.len(), 1);
    }

    #[test]
    fn test_glob_filter() {
        let (dir, builder) = project();
        fs::write(
            dir.path().join("nbs/00_core.ipynb"),
            minimal_notebook("Core"),
        )
        .unwrap();
        fs::write(
            dir.path().join("nbs/01_extra.ipynb"),
            minimal_notebook("Extra"),
        )
        .unwrap();

        let report = builder
            .build(&BuildConfig {
                fname: Some("00_*".to_string()),
                force_all: true,
                pause: 0.0,
                ..BuildConfig::default()
            })
            .unwrap();
        assert_eq!(report.converted.len(), 1);
        assert!(report.converted[0].ends_with("00_core.ipynb"));
    }

    #[test]
    fn test_failure_is_isolated_per_notebook() {
        let (dir, builder) = project();
        fs::write(dir.path().join("nbs/00_bad.ipynb"), "not json at all").unwrap();
        fs::write(
            dir.path().join("nbs/01_good.ipynb"),
            minimal_notebook("Good"),
        )
        .unwrap();

        let report = builder
            .build(&BuildConfig {
                force_all: true,
                pause: 0.0,
                ..BuildConfig::default()
            })
            .unwrap();
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].ends_with("00_bad.ipynb"));
        assert!(dir.path().join("docs/01_good.html").exists());
    }

    #[test]
    fn test_missing_notebook_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let builder = DocBuilder::new(DocConfig::load_or_default(dir.path()));
        let err = builder.build(&build_config()).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }

    #[test]
    fn test_make_sidebar_and_readme() {
        let (dir, builder) = project();
        fs::write(
            dir.path().join("nbs/index.ipynb"),
            minimal_notebook("My Project"),
        )
        .unwrap();
        fs::write(
            dir.path().join("nbs/00_core.ipynb"),
            minimal_notebook("Core"),
        )
        .unwrap();

        builder.make_sidebar().unwrap();
        let sidebar: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("docs/sidebar.json")).unwrap())
                .unwrap();
        assert_eq!(sidebar["Core"], "00_core.html");
        assert_eq!(sidebar["My Project"], "index.html");

        builder.make_readme().unwrap();
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.contains("# My Project"));
    }

    #[test]
    fn test_make_readme_without_index_is_a_noop() {
        let (dir, builder) = project();
        builder.make_readme().unwrap();
        assert!(!dir.path().join("README.md").exists());
    }

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("00_*.ipynb").unwrap();
        assert!(re.is_match("00_core.ipynb"));
        assert!(!re.is_match("01_extra.ipynb"));
        let re = glob_to_regex("0?_core.ipynb").unwrap();
        assert!(re.is_match("00_core.ipynb"));
        assert!(re.is_match("0x_core.ipynb"));
    }
}
