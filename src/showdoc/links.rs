use super::{DocLinker, Element, LinkInjector, SourceLinker};
use crate::DocConfig;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

static BACKTICK_SPAN: OnceLock<Regex> = OnceLock::new();

fn backtick_span() -> &'static Regex {
    BACKTICK_SPAN.get_or_init(|| Regex::new(r"`([^`\s]+)`").unwrap())
}

/// Source-link resolver pointing at a git hosting service.
///
/// Builds `{repo}/blob/{branch}/{file}#L{line}` from the element's captured
/// definition site. Elements without a location, or an unset repository
/// URL, resolve to no link at all.
#[derive(Debug, Clone)]
pub struct GitSourceLinker {
    repo_url: String,
    branch: String,
}

impl GitSourceLinker {
    pub fn new(repo_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
        }
    }

    pub fn from_config(config: &DocConfig) -> Self {
        Self::new(config.git_url.clone(), config.branch.clone())
    }
}

impl SourceLinker for GitSourceLinker {
    fn source_link(&self, elt: &Element) -> Option<String> {
        if self.repo_url.is_empty() {
            return None;
        }
        let location = elt.source.as_ref()?;
        Some(format!(
            "{}/blob/{}/{}#L{}",
            self.repo_url.trim_end_matches('/'),
            self.branch,
            location.file,
            location.line
        ))
    }
}

/// Doc-link resolver pointing at the rendered documentation site.
///
/// Builds `{base}/{module}.html#{qualified_name}`; elements without a
/// module page, or an unset site host, resolve to no link.
#[derive(Debug, Clone)]
pub struct SiteDocLinker {
    base_url: String,
}

impl SiteDocLinker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &DocConfig) -> Self {
        if config.doc_host.is_empty() {
            Self::new("")
        } else {
            Self::new(config.doc_base())
        }
    }
}

impl DocLinker for SiteDocLinker {
    fn doc_link(&self, elt: &Element) -> Option<String> {
        if self.base_url.is_empty() {
            return None;
        }
        let module = elt.module.as_ref()?;
        Some(format!(
            "{}/{module}.html#{}",
            self.base_url.trim_end_matches('/'),
            elt.qualified_name
        ))
    }
}

/// Cross-reference injector for backticked mentions.
///
/// Scans prose for `` `name` `` spans and replaces the ones registered in
/// its name-to-page index with Markdown links into the documentation site.
/// Unregistered names, and the element's own name, pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct BacktickLinkInjector {
    base_url: String,
    pages: BTreeMap<String, String>,
}

impl BacktickLinkInjector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages: BTreeMap::new(),
        }
    }

    /// Register a documented element name and the page it lives on.
    pub fn register(&mut self, name: impl Into<String>, page: impl Into<String>) {
        self.pages.insert(name.into(), page.into());
    }

    fn link_for(&self, name: &str) -> Option<String> {
        let page = self.pages.get(name)?;
        Some(format!(
            "{}/{page}.html#{name}",
            self.base_url.trim_end_matches('/')
        ))
    }
}

impl LinkInjector for BacktickLinkInjector {
    fn add_doc_links(&self, text: &str, elt: &Element) -> String {
        backtick_span()
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                if name == elt.qualified_name {
                    return caps[0].to_string();
                }
                match self.link_for(name) {
                    Some(url) => format!("[`{name}`]({url})"),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
