use super::{Docments, Element, ElementKind, ParamDescriptor, RETURN_KEY, SourceLocation};

/// Implementation of ParamDescriptor.
///
/// # Examples
///
/// ```
/// use nbverbose::ParamDescriptor;
///
/// let descriptor = ParamDescriptor::new()
///     .with_annotation("int")
///     .with_docment("number of retries");
///
/// assert_eq!(descriptor.annotation.as_deref(), Some("int"));
/// assert!(descriptor.default.is_none());
/// ```
impl ParamDescriptor {
    /// Creates an empty descriptor with no annotation, default, or description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a type annotation.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Attach a default value. Presence of a default marks the parameter
    /// as `, *optional*` in the rendered fragment.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a free-text description.
    pub fn with_docment(mut self, docment: impl Into<String>) -> Self {
        self.docment = Some(docment.into());
        self
    }
}

/// Implementation of Docments.
///
/// # Examples
///
/// ```
/// use nbverbose::{Docments, ParamDescriptor};
///
/// let docments = Docments::new()
///     .param("x", ParamDescriptor::new().with_annotation("int"))
///     .returns(ParamDescriptor::new().with_annotation("str"));
///
/// assert_eq!(docments.len(), 2);
/// assert!(docments.get("x").is_some());
/// ```
impl Docments {
    /// Creates an empty metadata mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter entry, preserving insertion order.
    pub fn param(mut self, name: impl Into<String>, descriptor: ParamDescriptor) -> Self {
        self.entries.insert(name.into(), descriptor);
        self
    }

    /// Add the synthetic return entry. Only call this when a return
    /// annotation or description actually exists; an empty return slot
    /// should stay absent so no stray section header is rendered.
    pub fn returns(mut self, descriptor: ParamDescriptor) -> Self {
        self.entries.insert(RETURN_KEY.to_string(), descriptor);
        self
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&ParamDescriptor> {
        self.entries.get(name)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries, synthetic keys included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Implementation of Element.
///
/// # Examples
///
/// ```
/// use nbverbose::{Docments, Element, ElementKind, ParamDescriptor};
///
/// let elt = Element::function(
///     "mylib.core.retry",
///     Docments::new().param("times", ParamDescriptor::new().with_annotation("int")),
/// )
/// .with_docstring("Retry a flaky call.")
/// .with_module("core");
///
/// assert_eq!(elt.kind, ElementKind::Function);
/// assert_eq!(elt.module.as_deref(), Some("core"));
/// ```
impl Element {
    fn new(qualified_name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            module: None,
            docstring: None,
            docments: Docments::new(),
            variants: Vec::new(),
            source: None,
        }
    }

    /// A free function or method with the given parameter metadata.
    pub fn function(qualified_name: impl Into<String>, docments: Docments) -> Self {
        Self {
            docments,
            ..Self::new(qualified_name, ElementKind::Function)
        }
    }

    /// A class, documented through its constructor parameters.
    pub fn class(qualified_name: impl Into<String>, docments: Docments) -> Self {
        Self {
            docments,
            ..Self::new(qualified_name, ElementKind::Class)
        }
    }

    /// An enumeration with the given variant names.
    pub fn enumeration(
        qualified_name: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
            ..Self::new(qualified_name, ElementKind::Enumeration)
        }
    }

    /// Anything that is neither callable nor a type; rendered as a bare
    /// code-formatted name with no argument section.
    pub fn opaque(qualified_name: impl Into<String>) -> Self {
        Self::new(qualified_name, ElementKind::Opaque)
    }

    /// Attach a docstring body.
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Attach the module (documentation page) the element belongs to.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attach the definition site used for source links.
    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.source = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docments_preserve_insertion_order() {
        let docments = Docments::new()
            .param("zebra", ParamDescriptor::new())
            .param("apple", ParamDescriptor::new())
            .param("mango", ParamDescriptor::new());

        let names: Vec<&str> = docments.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_enumeration_collects_variants() {
        let elt = Element::enumeration("mylib.Color", ["RED", "GREEN", "BLUE"]);
        assert_eq!(elt.kind, ElementKind::Enumeration);
        assert_eq!(elt.variants, vec!["RED", "GREEN", "BLUE"]);
        assert!(elt.docments.is_empty());
    }

    #[test]
    fn test_with_source() {
        let elt = Element::opaque("mylib.thing").with_source("mylib/core.py", 42);
        let loc = elt.source.unwrap();
        assert_eq!(loc.file, "mylib/core.py");
        assert_eq!(loc.line, 42);
    }
}
