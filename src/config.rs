//! Configuration types for Markdown-to-PDF rendering.
//!
//! Everything one document needs is held in a single [`DocumentConfig`]:
//! the source markup, the stylesheet, the header strings, the markup
//! extensions and the line-prefix rules. The pipeline reads nothing else,
//! so two configs that compare equal always produce the same HTML.
//!
//! Build one with [`DocumentConfig::builder()`] or start from a built-in
//! [`crate::profiles::Profile`].

use crate::error::Exam2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for rendering one document.
///
/// # Example
/// ```rust
/// use exam2pdf::{DocumentConfig, Extensions};
///
/// let config = DocumentConfig::builder()
///     .source("# Title\n\nHello **world**")
///     .stylesheet("body { font-size: 10pt; }")
///     .title("Mid-term Examination")
///     .extensions(Extensions::all())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DocumentConfig {
    /// Markdown source. Not validated; raw HTML passes through.
    pub source: String,

    /// CSS embedded verbatim in the `<style>` element of the document shell.
    pub stylesheet: String,

    /// Fixed header strings rendered above the content.
    pub header: HeaderFields,

    /// Text for the `<title>` element. Default: `"Document"`.
    pub page_title: String,

    /// Markup extensions enabled for the Markdown renderer. Default: all.
    pub extensions: Extensions,

    /// Line-prefix rewrite rules applied before Markdown rendering.
    /// Default: none.
    pub prefix_rules: Vec<PrefixRule>,

    /// Optional observer for per-stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            stylesheet: String::new(),
            header: HeaderFields::default(),
            page_title: "Document".to_string(),
            extensions: Extensions::default(),
            prefix_rules: Vec::new(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DocumentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentConfig")
            .field("source_len", &self.source.len())
            .field("stylesheet_len", &self.stylesheet.len())
            .field("header", &self.header)
            .field("page_title", &self.page_title)
            .field("extensions", &self.extensions)
            .field("prefix_rules", &self.prefix_rules)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl DocumentConfig {
    /// Create a new builder for `DocumentConfig`.
    pub fn builder() -> DocumentConfigBuilder {
        DocumentConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DocumentConfig`].
#[derive(Debug)]
pub struct DocumentConfigBuilder {
    config: DocumentConfig,
}

impl DocumentConfigBuilder {
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.config.source = source.into();
        self
    }

    pub fn stylesheet(mut self, css: impl Into<String>) -> Self {
        self.config.stylesheet = css.into();
        self
    }

    pub fn header(mut self, header: HeaderFields) -> Self {
        self.config.header = header;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.header.title = Some(title.into());
        self
    }

    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.config.header.course = Some(course.into());
        self
    }

    pub fn info_line(mut self, line: impl Into<String>) -> Self {
        self.config.header.info_lines.push(line.into());
        self
    }

    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.config.page_title = title.into();
        self
    }

    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.config.extensions = extensions;
        self
    }

    pub fn prefix_rule(mut self, rule: PrefixRule) -> Self {
        self.config.prefix_rules.push(rule);
        self
    }

    pub fn prefix_rules(mut self, rules: Vec<PrefixRule>) -> Self {
        self.config.prefix_rules = rules;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DocumentConfig, Exam2PdfError> {
        let c = &self.config;
        for rule in &c.prefix_rules {
            if rule.prefix.is_empty() {
                return Err(Exam2PdfError::InvalidConfig(
                    "Prefix rules must have a non-empty prefix".into(),
                ));
            }
            if !(1..=6).contains(&rule.level) {
                return Err(Exam2PdfError::InvalidConfig(format!(
                    "Heading level must be 1–6, got {} for prefix '{}'",
                    rule.level, rule.prefix
                )));
            }
        }
        if c.page_title.contains('\n') {
            return Err(Exam2PdfError::InvalidConfig(
                "Page title must be a single line".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Header ───────────────────────────────────────────────────────────────

/// Fixed strings rendered in the header block above the content.
///
/// The header block is emitted only when at least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    /// Main title, rendered as `<h1>`.
    pub title: Option<String>,
    /// Course or paper name, rendered as `<h2 class="course-title">`.
    pub course: Option<String>,
    /// Metadata lines such as duration or maximum marks, one
    /// `<p class="header-info">` each.
    pub info_lines: Vec<String>,
}

impl HeaderFields {
    /// `true` when no header field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.course.is_none() && self.info_lines.is_empty()
    }
}

// ── Line-prefix rules ────────────────────────────────────────────────────

/// Rewrites a line starting with `prefix` into a Markdown heading.
///
/// The rewritten line is `"#" * level + " " + line`, with every occurrence
/// of `strip` (if any) removed from `line` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub level: u8,
    pub strip: Option<String>,
}

impl PrefixRule {
    /// Rule that keeps the matched line intact after the heading marker.
    pub fn new(prefix: impl Into<String>, level: u8) -> Self {
        Self {
            prefix: prefix.into(),
            level,
            strip: None,
        }
    }

    /// Remove `token` from the matched line before adding the marker.
    pub fn stripping(mut self, token: impl Into<String>) -> Self {
        self.strip = Some(token.into());
        self
    }

    /// The Markdown heading marker for this rule, e.g. `"##"`.
    pub fn marker(&self) -> String {
        "#".repeat(self.level as usize)
    }
}

// ── Markup extensions ────────────────────────────────────────────────────

/// Named Markdown extensions understood by the markup renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    /// Pipe-delimited tables.
    pub tables: bool,
    /// Triple-delimiter code blocks rendered as `<pre><code>`.
    pub fenced_code: bool,
    /// Single newlines inside a block become `<br />`.
    pub line_breaks: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self::all()
    }
}

impl Extensions {
    /// Every extension enabled.
    pub const fn all() -> Self {
        Self {
            tables: true,
            fenced_code: true,
            line_breaks: true,
        }
    }

    /// Plain CommonMark.
    pub const fn none() -> Self {
        Self {
            tables: false,
            fenced_code: false,
            line_breaks: false,
        }
    }

    /// Parse a comma-separated list such as `"tables,fenced-code"`.
    ///
    /// Accepts `tables`, `fenced-code` / `fenced_code`, and
    /// `line-breaks` / `nl2br`. `all` and `none` are shorthands.
    pub fn parse(list: &str) -> Result<Self, Exam2PdfError> {
        let list = list.trim().to_lowercase();
        match list.as_str() {
            "all" => return Ok(Self::all()),
            "" | "none" => return Ok(Self::none()),
            _ => {}
        }

        let mut ext = Self::none();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "tables" => ext.tables = true,
                "fenced-code" | "fenced_code" => ext.fenced_code = true,
                "line-breaks" | "line_breaks" | "nl2br" => ext.line_breaks = true,
                other => {
                    return Err(Exam2PdfError::UnknownExtension {
                        name: other.to_string(),
                    })
                }
            }
        }
        Ok(ext)
    }

    /// Canonical names of the enabled extensions.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.tables {
            names.push("tables");
        }
        if self.fenced_code {
            names.push("fenced-code");
        }
        if self.line_breaks {
            names.push("line-breaks");
        }
        names
    }
}
