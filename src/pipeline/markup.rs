//! Markdown → HTML fragment rendering.
//!
//! The renderer sits behind [`MarkupRenderer`] so the pipeline never
//! depends on a particular Markdown engine. [`ComrakRenderer`] is the
//! default and maps the three named extensions onto comrak options.
//!
//! Raw HTML in the source is passed through untouched. Exam papers mix
//! Markdown with `<div class="…">` and `<span class="marks">` wrappers and
//! expect them to reach the stylesheet.

use crate::config::Extensions;
use crate::pipeline::assemble::escape_html;
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, Options};
use tracing::{debug, warn};

/// Capability: render a markup string to an HTML fragment.
///
/// Implementations must be deterministic and must never fail on arbitrary
/// text; malformed input is rendered best-effort.
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, markup: &str, extensions: &Extensions) -> String;
}

/// CommonMark renderer backed by comrak.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakRenderer;

impl ComrakRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options(extensions: &Extensions) -> Options<'static> {
        let mut options = Options::default();
        options.extension.table = extensions.tables;
        options.render.hardbreaks = extensions.line_breaks;
        options.render.r#unsafe = true;
        options
    }
}

impl MarkupRenderer for ComrakRenderer {
    fn render(&self, markup: &str, extensions: &Extensions) -> String {
        let options = Self::options(extensions);
        let arena = Arena::new();
        let root = parse_document(&arena, markup, &options);
        if !extensions.fenced_code {
            unfence(root);
        }

        let mut html = String::new();
        if let Err(err) = format_html(root, &options, &mut html) {
            warn!("Markup formatting stopped early: {}", err);
        }
        debug!(
            "Rendered {} bytes of markup → {} bytes of HTML ({})",
            markup.len(),
            html.len(),
            extensions.names().join(", ")
        );
        html
    }
}

/// Render with the default engine.
pub fn render_markup(markup: &str, extensions: &Extensions) -> String {
    ComrakRenderer.render(markup, extensions)
}

// ── Fenced-code opt-out ──────────────────────────────────────────────────

/// Turn every fenced code block back into the paragraph of text it was
/// written as, fences included. Indented code blocks are left alone.
fn unfence<'a>(root: &'a AstNode<'a>) {
    for node in root.descendants() {
        let mut data = node.data.borrow_mut();
        let text = match &data.value {
            NodeValue::CodeBlock(block) if block.fenced => {
                let fence = char::from(block.fence_char)
                    .to_string()
                    .repeat(block.fence_length);
                format!("{fence}{}\n{}{fence}", block.info, block.literal)
            }
            _ => continue,
        };
        data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: format!("<p>{}</p>\n", escape_html(&text)),
        });
    }
}
