use crate::showdoc::DisplaySurface;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Converts Markdown documentation text into HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn md_to_html(&self, markdown: &str) -> String;
}

static INLINE_CODE: OnceLock<Regex> = OnceLock::new();
static BOLD: OnceLock<Regex> = OnceLock::new();
static ITALIC: OnceLock<Regex> = OnceLock::new();
static LINK: OnceLock<Regex> = OnceLock::new();
static HEADING: OnceLock<Regex> = OnceLock::new();

/// Regex-driven renderer for the Markdown subset the assembler emits.
///
/// Handles ATX headings, fenced code blocks, list items, blockquotes,
/// inline code/bold/italic, links, and paragraphs. Lines that are already
/// HTML pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct SimpleMarkdown;

impl SimpleMarkdown {
    pub fn new() -> Self {
        Self
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    fn inline(text: &str) -> String {
        let code = INLINE_CODE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap());
        let bold = BOLD.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
        let italic = ITALIC.get_or_init(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());
        let link = LINK.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

        let out = code.replace_all(text, "<code>$1</code>");
        let out = bold.replace_all(&out, "<strong>$1</strong>");
        let out = italic.replace_all(&out, "<em>$1</em>");
        link.replace_all(&out, r#"<a href="$2">$1</a>"#).into_owned()
    }
}

impl MarkdownRenderer for SimpleMarkdown {
    fn md_to_html(&self, markdown: &str) -> String {
        let heading = HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
        let mut html = String::new();
        let mut paragraph: Vec<String> = Vec::new();
        let mut in_code = false;
        let mut in_list = false;

        let flush_paragraph = |html: &mut String, paragraph: &mut Vec<String>| {
            if !paragraph.is_empty() {
                html.push_str(&format!("<p>{}</p>\n", Self::inline(&paragraph.join(" "))));
                paragraph.clear();
            }
        };
        let close_list = |html: &mut String, in_list: &mut bool| {
            if *in_list {
                html.push_str("</ul>\n");
                *in_list = false;
            }
        };

        for line in markdown.lines() {
            if line.trim_start().starts_with("```") {
                flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                if in_code {
                    html.push_str("</code></pre>\n");
                } else {
                    html.push_str("<pre><code>");
                }
                in_code = !in_code;
                continue;
            }
            if in_code {
                html.push_str(&Self::escape(line));
                html.push('\n');
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
            } else if let Some(caps) = heading.captures(trimmed) {
                flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                let level = caps[1].len();
                html.push_str(&format!(
                    "<h{level}>{}</h{level}>\n",
                    Self::inline(&caps[2])
                ));
            } else if let Some(item) = trimmed.strip_prefix("- ") {
                flush_paragraph(&mut html, &mut paragraph);
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>\n", Self::inline(item)));
            } else if let Some(quoted) = trimmed.strip_prefix("> ") {
                flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                html.push_str(&format!("<blockquote>{}</blockquote>\n", Self::inline(quoted)));
            } else if trimmed.starts_with('<') {
                // Already HTML, e.g. an assembled doc header.
                flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                html.push_str(trimmed);
                html.push('\n');
            } else {
                paragraph.push(trimmed.to_string());
            }
        }
        if in_code {
            html.push_str("</code></pre>\n");
        }
        flush_paragraph(&mut html, &mut paragraph);
        close_list(&mut html, &mut in_list);
        html
    }
}

/// Display surface writing to standard output, paging through `$PAGER`
/// when one is configured.
#[derive(Debug, Clone, Default)]
pub struct StdoutSurface;

impl StdoutSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for StdoutSurface {
    fn display_markdown(&self, markdown: &str) {
        println!("{markdown}");
    }

    fn page_html(&self, html: &str) -> bool {
        let Ok(pager) = std::env::var("PAGER") else {
            return false;
        };
        if pager.is_empty() {
            return false;
        }
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&pager)
            .stdin(Stdio::piped())
            .spawn();
        let Ok(mut child) = spawned else {
            return false;
        };
        if let Some(stdin) = child.stdin.as_mut() {
            if stdin.write_all(html.as_bytes()).is_err() {
                return false;
            }
        }
        matches!(child.wait(), Ok(status) if status.success())
    }
}
