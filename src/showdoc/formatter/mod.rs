mod kinds;

pub use kinds::{KindRules, format_doc_head};

use crate::DocConfig;
use crate::render::{SimpleMarkdown, StdoutSurface};
use crate::showdoc::{
    BacktickLinkInjector, DisplaySurface, DocBlock, DocLinker, Element, GitSourceLinker,
    LinkInjector, RETURN_KEY, SELF_KEY, SiteDocLinker, SourceLinker,
};

/// Render the parameter/return documentation fragment for an element.
///
/// The receiver entry is always dropped first. The `**Parameters:**` header
/// is emitted only when the mapping still has entries afterwards (the
/// synthetic `"return"` entry counts). A parameter carrying a default value
/// is suffixed `, *optional*`; one without a default gets no suffix. Absent
/// annotations and descriptions render as omitted sub-sections. The
/// `**Returns**:` header appears at most once, whether the return slot has
/// an annotation, a description, or both.
///
/// An element with nothing to document yields an empty string, never a
/// stray header and never an error.
///
/// # Examples
///
/// ```
/// use nbverbose::{format_args, Docments, Element, ParamDescriptor};
///
/// let elt = Element::function(
///     "mylib.clamp",
///     Docments::new().param(
///         "x",
///         ParamDescriptor::new().with_annotation("int").with_docment("value to clamp"),
///     ),
/// );
/// let fragment = format_args(&elt);
/// assert!(fragment.starts_with("**Parameters:**"));
/// assert!(fragment.contains("**`x`** : *`int`*"));
/// ```
pub fn format_args(elt: &Element) -> String {
    let mut arg_string = String::new();
    let entries: Vec<(&str, &crate::ParamDescriptor)> = elt
        .docments
        .iter()
        .filter(|(name, _)| *name != SELF_KEY)
        .collect();
    if entries.is_empty() {
        return arg_string;
    }

    arg_string.push_str("**Parameters:**\n\n");
    for (name, item) in &entries {
        if *name == RETURN_KEY {
            continue;
        }
        arg_string.push_str(&format!("\n - **`{name}`**"));
        if let Some(annotation) = &item.annotation {
            arg_string.push_str(&format!(" : *`{annotation}`*"));
        }
        if item.default.is_some() {
            arg_string.push_str(", *optional*");
        }
        arg_string.push('\n');
        if let Some(docment) = &item.docment {
            arg_string.push_str(&format!("\t\t{docment}\n\n"));
        }
    }

    if let Some(ret) = elt.docments.get(RETURN_KEY) {
        let mut header_emitted = false;
        if let Some(annotation) = &ret.annotation {
            arg_string.push_str("\n\n**Returns**:\n");
            header_emitted = true;
            arg_string.push_str(&format!("\n * *`{annotation}`*"));
        }
        if let Some(docment) = &ret.docment {
            if !header_emitted {
                arg_string.push_str("\n\n**Returns**:\n");
            }
            arg_string.push_str(&format!("\n\t\t{docment}\n\n"));
        }
    }
    arg_string
}

/// Options controlling how [`ShowDoc::show_doc`] assembles a block.
#[derive(Debug, Clone)]
pub struct ShowDocOptions {
    /// Include the docstring body
    pub doc_string: bool,

    /// Display name overriding the element's qualified name
    pub name: Option<String>,

    /// Explicit heading level; wins over every default
    pub title_level: Option<u8>,

    /// Heading level used for classes and enumerations when no explicit
    /// level is given
    pub default_cls_level: u8,
}

impl Default for ShowDocOptions {
    fn default() -> Self {
        Self {
            doc_string: true,
            name: None,
            title_level: None,
            default_cls_level: 2,
        }
    }
}

/// The document assembler.
///
/// Owns the injected collaborators (source-link resolver, doc-link
/// resolver, cross-reference injector, Markdown renderer, display surface)
/// and the project configuration. Holds no mutable state: every call
/// builds a fresh [`DocBlock`], so identical inputs always produce
/// identical output.
///
/// # Examples
///
/// ```
/// use nbverbose::{Docments, DocConfig, Element, ParamDescriptor, ShowDoc, ShowDocOptions};
///
/// let show = ShowDoc::new(DocConfig::default());
/// let elt = Element::function(
///     "mylib.greet",
///     Docments::new().param("name", ParamDescriptor::new().with_annotation("str")),
/// )
/// .with_docstring("Say hello.");
///
/// let md = show.show_doc(&elt, &ShowDocOptions::default());
/// assert!(md.contains(r#"<h4 id="mylib.greet""#));
/// assert!(md.contains("**`name`** : *`str`*"));
/// ```
pub struct ShowDoc {
    config: DocConfig,
    source_linker: Box<dyn SourceLinker>,
    doc_linker: Box<dyn DocLinker>,
    link_injector: Box<dyn LinkInjector>,
    renderer: Box<dyn crate::render::MarkdownRenderer>,
    surface: Box<dyn DisplaySurface>,
}

impl ShowDoc {
    /// Create an assembler with collaborators derived from `config`.
    pub fn new(config: DocConfig) -> Self {
        let source_linker = Box::new(GitSourceLinker::from_config(&config));
        let doc_linker = Box::new(SiteDocLinker::from_config(&config));
        let link_injector = Box::new(BacktickLinkInjector::new(config.doc_base()));
        Self {
            config,
            source_linker,
            doc_linker,
            link_injector,
            renderer: Box::new(SimpleMarkdown::new()),
            surface: Box::new(StdoutSurface::new()),
        }
    }

    /// Swap the source-link resolver.
    pub fn with_source_linker(mut self, linker: Box<dyn SourceLinker>) -> Self {
        self.source_linker = linker;
        self
    }

    /// Swap the doc-link resolver.
    pub fn with_doc_linker(mut self, linker: Box<dyn DocLinker>) -> Self {
        self.doc_linker = linker;
        self
    }

    /// Swap the cross-reference link injector.
    pub fn with_link_injector(mut self, injector: Box<dyn LinkInjector>) -> Self {
        self.link_injector = injector;
        self
    }

    /// Swap the Markdown renderer used by [`ShowDoc::doc`].
    pub fn with_renderer(mut self, renderer: Box<dyn crate::render::MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Swap the display surface used by [`ShowDoc::display_doc`] and
    /// [`ShowDoc::doc`].
    pub fn with_surface(mut self, surface: Box<dyn DisplaySurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Assemble the documentation block for `elt`.
    pub fn doc_block(&self, elt: &Element, opts: &ShowDocOptions) -> DocBlock {
        let qname = opts
            .name
            .clone()
            .unwrap_or_else(|| elt.qualified_name.clone());
        let (title, args) = format_doc_head(elt, &qname);
        let rules = KindRules::for_kind(elt.kind);
        let heading_level = opts.title_level.unwrap_or(if rules.uses_cls_level {
            opts.default_cls_level
        } else {
            4
        });
        let docstring_body = if opts.doc_string {
            elt.docstring.as_ref().map(|docstring| {
                if self.config.monospace_docstrings {
                    // doc links don't work inside pre/code blocks
                    format!("```\n{docstring}\n```")
                } else {
                    self.link_injector.add_doc_links(docstring, elt)
                }
            })
        } else {
            None
        };
        let parameter_section = if args.is_empty() {
            None
        } else {
            let fragment = format_args(elt);
            (!fragment.is_empty()).then_some(fragment)
        };
        DocBlock {
            title,
            heading_level,
            anchor: qname,
            source_link: self.source_linker.source_link(elt),
            signature: (!args.is_empty()).then_some(args),
            docstring_body,
            parameter_section,
        }
    }

    /// Produce the documentation block for `elt` as Markdown text.
    pub fn show_doc(&self, elt: &Element, opts: &ShowDocOptions) -> String {
        self.doc_block(elt, opts).to_markdown()
    }

    /// Render the documentation block to the display surface.
    pub fn display_doc(&self, elt: &Element, opts: &ShowDocOptions) {
        let markdown = self.show_doc(elt, opts);
        self.surface.display_markdown(&markdown);
    }

    /// Preview documentation for `elt`.
    ///
    /// Appends a "Show in docs" hyperlink when the doc-link resolver yields
    /// one, renders the Markdown to HTML and routes it through the pager.
    /// When no pager is available the Markdown is displayed directly.
    pub fn doc(&self, elt: &Element) {
        let mut markdown = self.show_doc(elt, &ShowDocOptions::default());
        if let Some(link) = self.doc_linker.doc_link(elt) {
            markdown.push_str(&format!(
                "\n\n<a href=\"{link}\" target=\"_blank\" rel=\"noreferrer noopener\">Show in docs</a>"
            ));
        }
        let html = self.renderer.md_to_html(&markdown);
        if !self.surface.page_html(&html) {
            self.surface.display_markdown(&markdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::showdoc::{Docments, ElementKind, ParamDescriptor};

    fn show() -> ShowDoc {
        ShowDoc::new(DocConfig::default())
    }

    #[test]
    fn test_no_parameters_yields_empty_fragment() {
        let elt = Element::function("mylib.noop", Docments::new());
        assert_eq!(format_args(&elt), "");
    }

    #[test]
    fn test_required_parameter_has_no_optional_suffix() {
        let elt = Element::function(
            "mylib.f",
            Docments::new().param("x", ParamDescriptor::new().with_annotation("int")),
        );
        let fragment = format_args(&elt);
        assert!(fragment.contains("**`x`** : *`int`*"));
        assert!(!fragment.contains(", *optional*"));
    }

    #[test]
    fn test_defaulted_parameter_is_labelled_optional() {
        let elt = Element::function(
            "mylib.f",
            Docments::new().param(
                "y",
                ParamDescriptor::new()
                    .with_annotation("str")
                    .with_default("'hi'"),
            ),
        );
        let fragment = format_args(&elt);
        assert!(fragment.contains("**`y`** : *`str`*, *optional*"));
    }

    #[test]
    fn test_receiver_never_rendered() {
        let elt = Element::function(
            "mylib.Widget.resize",
            Docments::new()
                .param("self", ParamDescriptor::new())
                .param("width", ParamDescriptor::new().with_annotation("int")),
        );
        let fragment = format_args(&elt);
        assert!(!fragment.contains("`self`"));
        assert!(fragment.contains("**`width`**"));
    }

    #[test]
    fn test_receiver_only_mapping_yields_empty_fragment() {
        let elt = Element::function(
            "mylib.Widget.id",
            Docments::new().param("self", ParamDescriptor::new()),
        );
        assert_eq!(format_args(&elt), "");
    }

    #[test]
    fn test_return_annotation_emits_single_header() {
        let elt = Element::function(
            "mylib.f",
            Docments::new().returns(ParamDescriptor::new().with_annotation("int")),
        );
        let fragment = format_args(&elt);
        assert_eq!(fragment.matches("**Returns**:").count(), 1);
        assert!(fragment.contains("*`int`*"));
    }

    #[test]
    fn test_return_annotation_and_docment_share_one_header() {
        let elt = Element::function(
            "mylib.f",
            Docments::new().returns(
                ParamDescriptor::new()
                    .with_annotation("int")
                    .with_docment("the computed total"),
            ),
        );
        let fragment = format_args(&elt);
        assert_eq!(fragment.matches("**Returns**:").count(), 1);
        assert!(fragment.contains("*`int`*"));
        assert!(fragment.contains("the computed total"));
    }

    #[test]
    fn test_return_docment_alone_emits_header() {
        let elt = Element::function(
            "mylib.f",
            Docments::new().returns(ParamDescriptor::new().with_docment("a summary")),
        );
        let fragment = format_args(&elt);
        assert_eq!(fragment.matches("**Returns**:").count(), 1);
        assert!(fragment.contains("a summary"));
    }

    #[test]
    fn test_kind_dispatch_selects_matching_head() {
        let show = show();
        let opts = ShowDocOptions::default();

        let enumeration = Element::enumeration("mylib.Color", ["RED", "GREEN"]);
        let md = show.show_doc(&enumeration, &opts);
        assert!(md.contains("Enum = [RED, GREEN]"));

        let class = Element::class("mylib.Widget", Docments::new());
        let md = show.show_doc(&class, &opts);
        assert!(md.contains("<code>class</code> <code>mylib.Widget</code>"));

        let function = Element::function("mylib.run", Docments::new());
        let md = show.show_doc(&function, &opts);
        assert!(md.contains("<code>mylib.run</code>("));

        let opaque = Element::opaque("mylib.VERSION");
        assert_eq!(opaque.kind, ElementKind::Opaque);
        let md = show.show_doc(&opaque, &opts);
        assert!(md.contains("<code>mylib.VERSION</code>"));
        assert!(!md.contains("**Parameters:**"));
    }

    #[test]
    fn test_heading_levels() {
        let show = show();
        let class = Element::class("mylib.Widget", Docments::new());
        let function = Element::function("mylib.run", Docments::new());

        let md = show.show_doc(&class, &ShowDocOptions::default());
        assert!(md.starts_with("<h2 "));

        let md = show.show_doc(&function, &ShowDocOptions::default());
        assert!(md.starts_with("<h4 "));

        // Explicit override wins over both defaults.
        let opts = ShowDocOptions {
            title_level: Some(3),
            ..Default::default()
        };
        let md = show.show_doc(&class, &opts);
        assert!(md.starts_with("<h3 "));
    }

    #[test]
    fn test_name_override_sets_anchor_and_title() {
        let show = show();
        let elt = Element::function("mylib.internal_name", Docments::new());
        let opts = ShowDocOptions {
            name: Some("public_name".to_string()),
            ..Default::default()
        };
        let md = show.show_doc(&elt, &opts);
        assert!(md.contains(r#"id="public_name""#));
        assert!(md.contains("<code>public_name</code>"));
    }

    #[test]
    fn test_doc_string_flag_suppresses_body() {
        let show = show();
        let elt = Element::function("mylib.f", Docments::new()).with_docstring("Body text.");
        let opts = ShowDocOptions {
            doc_string: false,
            ..Default::default()
        };
        assert!(!show.show_doc(&elt, &opts).contains("Body text."));
        assert!(
            show.show_doc(&elt, &ShowDocOptions::default())
                .contains("Body text.")
        );
    }

    #[test]
    fn test_monospace_mode_wraps_docstring() {
        let config = DocConfig {
            monospace_docstrings: true,
            ..DocConfig::default()
        };
        let show = ShowDoc::new(config);
        let elt = Element::function("mylib.f", Docments::new()).with_docstring("Body text.");
        let md = show.show_doc(&elt, &ShowDocOptions::default());
        assert!(md.contains("```\nBody text.\n```"));
    }

    #[test]
    fn test_monospace_defaults_to_off() {
        let show = show();
        let elt = Element::function("mylib.f", Docments::new()).with_docstring("Body text.");
        let md = show.show_doc(&elt, &ShowDocOptions::default());
        assert!(!md.contains("```"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let show = show();
        let elt = Element::class(
            "mylib.Widget",
            Docments::new()
                .param(
                    "size",
                    ParamDescriptor::new()
                        .with_annotation("int")
                        .with_default("8")
                        .with_docment("edge length"),
                )
                .returns(ParamDescriptor::new().with_annotation("Widget")),
        )
        .with_docstring("A square widget.")
        .with_source("mylib/widget.py", 10);

        let opts = ShowDocOptions::default();
        assert_eq!(show.show_doc(&elt, &opts), show.show_doc(&elt, &opts));
    }

    #[test]
    fn test_source_link_floats_right_in_heading() {
        let config = DocConfig {
            git_url: "https://github.com/example/mylib".to_string(),
            ..DocConfig::default()
        };
        let show = ShowDoc::new(config);
        let elt = Element::function("mylib.f", Docments::new()).with_source("mylib/core.py", 7);
        let md = show.show_doc(&elt, &ShowDocOptions::default());
        assert!(md.contains(r#"class="source_link" style="float:right">[source]</a></h4>"#));
        assert!(md.contains("mylib/core.py#L7"));
    }

    #[test]
    fn test_parameters_header_present_with_only_return_entry() {
        // The synthetic return entry keeps the mapping non-empty, so the
        // header is still emitted before the Returns section.
        let elt = Element::function(
            "mylib.f",
            Docments::new().returns(ParamDescriptor::new().with_annotation("int")),
        );
        let fragment = format_args(&elt);
        assert!(fragment.starts_with("**Parameters:**"));
    }
}
