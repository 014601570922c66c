use crate::render::{MarkdownRenderer, SimpleMarkdown};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Cell flag dropping the whole cell from the exported page.
pub const HIDE_FLAG: &str = "#hide";

/// Cell flag hiding the input while keeping the outputs.
pub const HIDE_INPUT_FLAG: &str = "#hide_input";

/// Cell flag marking exported library code; input is hidden in the page.
pub const EXPORT_FLAG: &str = "#export";

/// Cell directive overriding the default class heading level.
pub const DEFAULT_CLS_LVL_FLAG: &str = "#default_cls_lvl";

/// Cell source as stored in notebook JSON: either a single string or a
/// list of line fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

impl Source {
    /// The source joined into one string.
    pub fn as_text(&self) -> String {
        match self {
            Source::Text(text) => text.clone(),
            Source::Lines(lines) => lines.concat(),
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,

    #[serde(default)]
    pub metadata: Value,

    #[serde(default)]
    pub source: Source,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Value>,
}

impl Cell {
    /// The cell source as one string.
    pub fn text(&self) -> String {
        self.source.as_text()
    }

    pub fn is_markdown(&self) -> bool {
        self.cell_type == "markdown"
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == "code"
    }

    /// Whether any line of the cell is exactly the given flag, optionally
    /// followed by arguments.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.text().lines().any(|line| {
            let line = line.trim();
            line == flag || line.starts_with(&format!("{flag} "))
        })
    }

    /// Whether the page should hide this cell's input.
    pub fn input_hidden(&self) -> bool {
        self.metadata
            .get("hide_input")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Drop flag lines from the cell source.
    pub fn strip_flags(&mut self) {
        let text = self.text();
        let kept = text
            .lines()
            .filter(|line| !is_flag_line(line.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        self.source = Source::Text(kept);
    }
}

fn is_flag_line(line: &str) -> bool {
    [HIDE_FLAG, HIDE_INPUT_FLAG, EXPORT_FLAG, DEFAULT_CLS_LVL_FLAG]
        .iter()
        .any(|flag| line == *flag || line.starts_with(&format!("{flag} ")))
}

/// A computational notebook as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,

    #[serde(default)]
    pub metadata: Value,

    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    #[serde(default)]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

/// Read and parse a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    if !path.exists() {
        return Err(Error::NotebookNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Scan the cells for a `#default_cls_lvl N` directive; 2 when absent or
/// unparsable.
pub fn find_default_level(cells: &[Cell]) -> u8 {
    for cell in cells {
        if !cell.is_code() {
            continue;
        }
        for line in cell.text().lines() {
            if let Some(rest) = line.trim().strip_prefix(DEFAULT_CLS_LVL_FLAG) {
                if let Ok(level) = rest.trim().parse() {
                    return level;
                }
            }
        }
    }
    2
}

/// Apply the cell directives: drop `#hide` cells, mark `#export` and
/// `#hide_input` cells as hidden-input, then strip the flag lines.
pub fn process_cells(nb: &mut Notebook) {
    nb.cells.retain(|cell| !cell.has_flag(HIDE_FLAG));
    for cell in &mut nb.cells {
        if cell.has_flag(EXPORT_FLAG) || cell.has_flag(HIDE_INPUT_FLAG) {
            if let Value::Object(meta) = &mut cell.metadata {
                meta.insert("hide_input".to_string(), Value::Bool(true));
            } else {
                cell.metadata = serde_json::json!({ "hide_input": true });
            }
        }
        cell.strip_flags();
    }
}

/// Executes a notebook's documentation cells.
///
/// The execution engine is an external collaborator; the default
/// [`NullExecutor`] leaves the notebook untouched.
pub trait NotebookExecutor: Send + Sync {
    fn execute(&self, nb: &mut Notebook, timeout: Duration) -> Result<()>;
}

/// No-op executor used when no execution engine is wired in.
#[derive(Debug, Clone, Default)]
pub struct NullExecutor;

impl NotebookExecutor for NullExecutor {
    fn execute(&self, _nb: &mut Notebook, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

/// Exports a processed notebook to an HTML page.
pub trait Exporter: Send + Sync {
    fn export(&self, nb: &Notebook) -> Result<String>;
}

/// Minimal HTML exporter.
///
/// Markdown cells go through the Markdown renderer; visible code cells
/// become `<pre><code>` blocks; text outputs are kept as output blocks.
pub struct BasicHtmlExporter {
    renderer: Box<dyn MarkdownRenderer>,
}

impl BasicHtmlExporter {
    pub fn new() -> Self {
        Self {
            renderer: Box::new(SimpleMarkdown::new()),
        }
    }

    pub fn with_renderer(renderer: Box<dyn MarkdownRenderer>) -> Self {
        Self { renderer }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    fn output_text(output: &Value) -> Option<String> {
        let text = output.get("text").or_else(|| {
            output
                .get("data")
                .and_then(|data| data.get("text/markdown").or_else(|| data.get("text/plain")))
        })?;
        match text {
            Value::String(s) => Some(s.clone()),
            Value::Array(lines) => Some(
                lines
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .concat(),
            ),
            _ => None,
        }
    }
}

impl Default for BasicHtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for BasicHtmlExporter {
    fn export(&self, nb: &Notebook) -> Result<String> {
        let mut body = String::new();
        for cell in &nb.cells {
            if cell.is_markdown() {
                body.push_str(&self.renderer.md_to_html(&cell.text()));
            } else if cell.is_code() {
                let text = cell.text();
                if !cell.input_hidden() && !text.trim().is_empty() {
                    body.push_str(&format!(
                        "<pre><code class=\"language-python\">{}</code></pre>\n",
                        Self::escape(&text)
                    ));
                }
                for output in &cell.outputs {
                    if let Some(text) = Self::output_text(output) {
                        // show_doc cells emit Markdown output; render it.
                        body.push_str(&format!(
                            "<div class=\"output\">{}</div>\n",
                            self.renderer.md_to_html(&text)
                        ));
                    }
                }
            }
        }
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n{body}</body>\n</html>\n"
        ))
    }
}
