mod descriptor;
pub mod formatter;
mod links;

use indexmap::IndexMap;

pub use formatter::{ShowDoc, ShowDocOptions, format_args};
pub use links::{BacktickLinkInjector, GitSourceLinker, SiteDocLinker};

/// Synthetic key for a bound-method receiver. Never rendered.
pub const SELF_KEY: &str = "self";

/// Synthetic key for the return-value slot of a callable.
pub const RETURN_KEY: &str = "return";

/// Closed classification of a documented element.
///
/// Decided once when the [`Element`] is constructed; every downstream
/// formatting decision dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// An enumeration type; documented by listing its variants
    Enumeration,

    /// A class (non-enum) type; documented via its constructor parameters
    Class,

    /// A free function or method
    Function,

    /// Anything else; rendered as a bare code-formatted name
    Opaque,
}

/// Metadata for one formal parameter or for the return-value slot.
///
/// The owning [`Docments`] map carries the parameter name as the key.
/// Every field is optional: an absent field renders as an omitted
/// sub-section, never as an error. Presence of `default` is semantically
/// meaningful: a parameter with a default is labelled `, *optional*` in
/// the rendered fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Type annotation, e.g. `int`
    pub annotation: Option<String>,

    /// Default value, rendered verbatim; presence marks the parameter optional
    pub default: Option<String>,

    /// Free-text description attached at the definition site
    pub docment: Option<String>,
}

/// Ordered parameter metadata for a documented element.
///
/// Keys are parameter names plus the synthetic [`SELF_KEY`] and
/// [`RETURN_KEY`] entries. Insertion order is the rendering order.
/// The `"return"` entry should only be inserted when a return annotation
/// or description actually exists.
#[derive(Debug, Clone, Default)]
pub struct Docments {
    entries: IndexMap<String, ParamDescriptor>,
}

/// Location of an element's definition, relative to the repository root.
///
/// Feeds the source-link resolver; elements without a captured location
/// simply render without a source link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Path of the defining file, relative to the repository root
    pub file: String,

    /// 1-based line number of the definition
    pub line: u32,
}

/// A documented element with all metadata captured as plain data.
///
/// Nothing here requires runtime reflection: descriptors are extracted
/// ahead of time (by a doc-comment extraction step) and handed to the
/// formatter as-is.
#[derive(Debug, Clone)]
pub struct Element {
    /// Fully-scoped identifier, used as anchor and link key
    pub qualified_name: String,

    /// Closed kind classification
    pub kind: ElementKind,

    /// Module (documentation page) the element belongs to
    pub module: Option<String>,

    /// Attached docstring body
    pub docstring: Option<String>,

    /// Ordered parameter and return metadata
    pub docments: Docments,

    /// Variant names, populated for enumerations only
    pub variants: Vec<String>,

    /// Definition site, when known
    pub source: Option<SourceLocation>,
}

/// The assembled documentation block for one element.
///
/// Transient: constructed fresh per invocation, rendered, discarded.
#[derive(Debug, Clone)]
pub struct DocBlock {
    /// Formatted display name markup
    pub title: String,

    /// Effective heading level
    pub heading_level: u8,

    /// Anchor id, equal to the qualified name
    pub anchor: String,

    /// Resolved source URL, when available
    pub source_link: Option<String>,

    /// Formatted signature/argument string, when the kind produces one
    pub signature: Option<String>,

    /// Docstring body, monospaced or link-annotated
    pub docstring_body: Option<String>,

    /// Rendered parameter/return fragment
    pub parameter_section: Option<String>,
}

impl DocBlock {
    /// Render the block as a Markdown document fragment.
    pub fn to_markdown(&self) -> String {
        let source_link = self
            .source_link
            .as_ref()
            .map(|url| {
                format!(r#"<a href="{url}" class="source_link" style="float:right">[source]</a>"#)
            })
            .unwrap_or_default();
        let mut doc = format!(
            r#"<h{level} id="{anchor}" class="doc_header">{title}{source_link}</h{level}>"#,
            level = self.heading_level,
            anchor = self.anchor,
            title = self.title,
        );
        match &self.signature {
            Some(signature) => doc.push_str(&format!("\n\n> {signature}\n\n")),
            None => doc.push_str("\n\n"),
        }
        if let Some(body) = &self.docstring_body {
            doc.push_str(body);
        }
        if let Some(params) = &self.parameter_section {
            doc.push_str(&format!("\n\n{params}"));
        }
        doc
    }
}

/// Resolves a source-code hyperlink for an element.
pub trait SourceLinker: Send + Sync {
    /// URL of the element's definition, or `None` when unresolvable.
    fn source_link(&self, elt: &Element) -> Option<String>;
}

/// Resolves a documentation-site hyperlink for an element.
pub trait DocLinker: Send + Sync {
    /// URL of the element's documentation page, or `None` when unresolvable.
    fn doc_link(&self, elt: &Element) -> Option<String>;
}

/// Injects cross-reference links into prose that mentions other
/// documented elements.
pub trait LinkInjector: Send + Sync {
    /// Return `text` with backticked mentions of documented elements
    /// replaced by Markdown links. Unknown names pass through untouched.
    fn add_doc_links(&self, text: &str, elt: &Element) -> String;
}

/// An interactive surface that can render Markdown and, when available,
/// page HTML.
pub trait DisplaySurface {
    /// Render Markdown to the surface.
    fn display_markdown(&self, markdown: &str);

    /// Page HTML content; returns `false` when no pager is available so
    /// the caller can fall back to [`DisplaySurface::display_markdown`].
    fn page_html(&self, html: &str) -> bool;
}
