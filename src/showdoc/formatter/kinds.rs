use crate::showdoc::{Element, ElementKind, RETURN_KEY, SELF_KEY};

/// Per-kind head formatting rules.
///
/// One closed table entry per [`ElementKind`]; the classification happens
/// once at element construction and everything here is a pure lookup.
#[derive(Debug, Clone, Copy)]
pub struct KindRules {
    /// Markup prepended to the display name
    pub name_keyword: &'static str,

    /// Whether the heading level defaults to the caller-supplied class level
    pub uses_cls_level: bool,

    /// Whether the kind produces an argument string at all
    pub has_arguments: bool,
}

const FUNCTION_RULES: KindRules = KindRules {
    name_keyword: "",
    uses_cls_level: false,
    has_arguments: true,
};

const CLASS_RULES: KindRules = KindRules {
    name_keyword: "<code>class</code> ",
    uses_cls_level: true,
    has_arguments: true,
};

const ENUM_RULES: KindRules = KindRules {
    name_keyword: "",
    uses_cls_level: true,
    has_arguments: true,
};

const OPAQUE_RULES: KindRules = KindRules {
    name_keyword: "",
    uses_cls_level: false,
    has_arguments: false,
};

impl KindRules {
    #[inline(always)]
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Function => FUNCTION_RULES,
            ElementKind::Class => CLASS_RULES,
            ElementKind::Enumeration => ENUM_RULES,
            ElementKind::Opaque => OPAQUE_RULES,
        }
    }
}

/// Build the `(display_name, argument_string)` pair for an element.
///
/// The argument string is empty for opaque elements; the caller treats an
/// empty string as "no signature, no parameter section".
pub fn format_doc_head(elt: &Element, qname: &str) -> (String, String) {
    let rules = KindRules::for_kind(elt.kind);
    let name = format!("{}<code>{qname}</code>", rules.name_keyword);
    if !rules.has_arguments {
        return (name, String::new());
    }
    let args = match elt.kind {
        ElementKind::Enumeration => {
            format!("<code>Enum = [{}]</code>", elt.variants.join(", "))
        }
        _ => format!("<code>{qname}</code>{}", signature_string(elt)),
    };
    (name, args)
}

/// Render the formal parameter list as a compact signature, e.g.
/// `(x:int, y:str='a')`. The receiver and return entries never appear.
fn signature_string(elt: &Element) -> String {
    let pieces: Vec<String> = elt
        .docments
        .iter()
        .filter(|(name, _)| *name != SELF_KEY && *name != RETURN_KEY)
        .map(|(name, descriptor)| {
            let mut piece = name.to_string();
            if let Some(annotation) = &descriptor.annotation {
                piece.push_str(&format!(":{annotation}"));
            }
            if let Some(default) = &descriptor.default {
                piece.push_str(&format!("={default}"));
            }
            piece
        })
        .collect();
    format!("({})", pieces.join(", "))
}
