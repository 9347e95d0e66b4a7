//! HTML document → Typst markup.
//!
//! The assembled document is parsed with `scraper`, its `<style>` blocks are
//! compiled into a [`Stylesheet`], and the `<body>` is walked element by
//! element. Element-wide rules (`body`, `h1`, `strong`, `pre`, `table`, …)
//! become `#set`/`#show` rules in a preamble; class rules are applied inline
//! by wrapping the element in `#text`, `#block` or `#align` calls.
//!
//! Every embedded call is written as `#func(..)[..];`. The trailing `;` ends
//! the expression so that following text can never be parsed as a field
//! access or a second content argument.

use super::css::{Style, Stylesheet};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// A lowered document, ready for compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypstDocument {
    pub preamble: String,
    pub body: String,
}

impl TypstDocument {
    /// Full Typst source: preamble then body.
    pub fn source(&self) -> String {
        if self.preamble.is_empty() {
            return self.body.clone();
        }
        format!("{}\n\n{}\n", self.preamble, self.body)
    }
}

/// Lower a complete HTML document.
pub fn lower(html: &str) -> TypstDocument {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let css: String = elements(root, "style")
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    let sheet = Stylesheet::parse(&css);
    let title = elements(root, "title")
        .next()
        .map(|el| el.text().collect::<String>());

    let body_el = elements(root, "body").next().unwrap_or(root);
    let mut writer = Writer::new(&sheet);
    writer.children(body_el);

    let doc = TypstDocument {
        preamble: preamble(&sheet, title.as_deref()),
        body: writer.finish(),
    };
    debug!(
        "Lowered {} bytes of HTML → {} bytes of Typst ({} preamble)",
        html.len(),
        doc.body.len(),
        doc.preamble.len()
    );
    doc
}

fn elements<'a>(root: ElementRef<'a>, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

// ── Preamble ─────────────────────────────────────────────────────────────

fn preamble(sheet: &Stylesheet, title: Option<&str>) -> String {
    let mut rules: Vec<String> = Vec::new();

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        rules.push(format!("#set document(title: \"{}\")", escape_string(title)));
    }

    let page = sheet.get("@page");
    let body = sheet.get("body");

    let mut page_args = Vec::new();
    if let Some(paper) = page.and_then(|p| p.paper) {
        page_args.push(format!("paper: \"{paper}\""));
    }
    let margin = page
        .and_then(|p| p.margin.clone())
        .or_else(|| body.and_then(|b| b.margin.clone()));
    if let Some(margin) = margin {
        page_args.push(format!("margin: {margin}"));
    }
    push_call(&mut rules, "#set page", &page_args);

    if let Some(body) = body {
        push_call(&mut rules, "#set text", &body.text_args());
        let mut par = Vec::new();
        if let Some(ref leading) = body.leading {
            par.push(format!("leading: {leading}"));
        }
        if body.justify {
            par.push("justify: true".to_string());
        }
        push_call(&mut rules, "#set par", &par);
        if let Some(align) = body.align {
            rules.push(format!("#set align({})", align.as_typst()));
        }
    }

    if let Some(spacing) = sheet.get("p").and_then(|p| p.margin_bottom.clone()) {
        rules.push(format!("#set par(spacing: {spacing})"));
    }

    for level in 1..=6u8 {
        let Some(style) = sheet.get(&format!("h{level}")) else {
            continue;
        };
        let target = format!("#show heading.where(level: {level})");
        let text = style.text_args();
        if !text.is_empty() {
            rules.push(format!("{target}: set text({})", text.join(", ")));
        }
        if let Some(align) = style.align {
            rules.push(format!("{target}: set align({})", align.as_typst()));
        }
        let block = style.block_args();
        if !block.is_empty() {
            rules.push(format!("{target}: it => block({}, it)", block.join(", ")));
        }
    }

    for (selector, target) in [("strong", "strong"), ("b", "strong"), ("em", "emph"), ("i", "emph")] {
        if let Some(style) = sheet.get(selector) {
            let text = style.text_args();
            if !text.is_empty() {
                rules.push(format!("#show {target}: set text({})", text.join(", ")));
            }
        }
    }

    if let Some(code) = sheet.get("code") {
        let text = code.text_args();
        if !text.is_empty() {
            rules.push(format!("#show raw.where(block: false): set text({})", text.join(", ")));
        }
        if let Some(ref fill) = code.background {
            let radius = code.radius.clone().unwrap_or_else(|| "2pt".to_string());
            rules.push(format!(
                "#show raw.where(block: false): box.with(fill: {fill}, inset: (x: 2pt), outset: (y: 2pt), radius: {radius})"
            ));
        }
    }

    if let Some(pre) = sheet.get("pre") {
        let text = pre.text_args();
        if !text.is_empty() {
            rules.push(format!("#show raw.where(block: true): set text({})", text.join(", ")));
        }
        let block = pre.block_args();
        if !block.is_empty() {
            rules.push(format!("#show raw.where(block: true): block.with({})", block.join(", ")));
        }
    }

    if let Some(quote) = sheet.get("blockquote") {
        let text = quote.text_args();
        if !text.is_empty() {
            rules.push(format!("#show quote.where(block: true): set text({})", text.join(", ")));
        }
        let block = quote.block_args();
        if !block.is_empty() {
            rules.push(format!("#show quote.where(block: true): block.with({})", block.join(", ")));
        }
    }

    for (selector, func) in [("ul", "list"), ("ol", "enum")] {
        if let Some(indent) = sheet.get(selector).and_then(|s| s.margin_left.clone()) {
            rules.push(format!("#set {func}(indent: {indent})"));
        }
    }
    if let Some(spacing) = sheet.get("li").and_then(|s| s.margin_bottom.clone()) {
        rules.push(format!("#set list(spacing: {spacing})"));
        rules.push(format!("#set enum(spacing: {spacing})"));
    }

    let mut table_args = Vec::new();
    let cell = merged(sheet, &["table", "th", "td"]);
    if let Some(stroke) = cell.border.or(cell.border_bottom) {
        table_args.push(format!("stroke: {stroke}"));
    }
    if let Some(inset) = cell.padding {
        table_args.push(format!("inset: {inset}"));
    }
    if let Some(align) = sheet.get("td").and_then(|s| s.align) {
        table_args.push(format!("align: {}", align.as_typst()));
    }
    push_call(&mut rules, "#set table", &table_args);

    rules.join("\n")
}

fn merged(sheet: &Stylesheet, selectors: &[&str]) -> Style {
    let mut style = Style::default();
    for selector in selectors {
        if let Some(s) = sheet.get(selector) {
            style.merge(s);
        }
    }
    style
}

fn push_call(rules: &mut Vec<String>, head: &str, args: &[String]) {
    if !args.is_empty() {
        rules.push(format!("{head}({})", args.join(", ")));
    }
}

// ── Body ─────────────────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// `2024.` at the start of a line would open a numbered list.
static RE_ENUM_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)\.").unwrap());

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

struct Writer<'s> {
    sheet: &'s Stylesheet,
    out: String,
    /// `out.len()` just after the most recent content-block opener, so an
    /// escaped `\[` in text is never mistaken for one.
    opened_at: Option<usize>,
}

impl<'s> Writer<'s> {
    fn new(sheet: &'s Stylesheet) -> Self {
        Self {
            sheet,
            out: String::new(),
            opened_at: None,
        }
    }

    /// A fresh writer sharing the stylesheet, for content that is wrapped
    /// after it has been produced.
    fn fork(&self) -> Writer<'s> {
        Writer::new(self.sheet)
    }

    fn finish(self) -> String {
        let trimmed: Vec<&str> = self.out.lines().map(str::trim_end).collect();
        let joined = trimmed.join("\n");
        RE_BLANK_RUNS.replace_all(joined.trim(), "\n\n").into_owned()
    }

    fn render_children(&self, el: ElementRef) -> String {
        let mut sub = self.fork();
        sub.children(el);
        sub.finish()
    }

    /// Push a call head ending in `[` and remember where its content starts.
    fn open(&mut self, head: &str) {
        self.out.push_str(head);
        self.opened_at = Some(self.out.len());
    }

    fn at_open(&self) -> bool {
        self.opened_at == Some(self.out.len())
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n') || self.at_open()
    }

    fn block_break(&mut self) {
        let keep = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(keep);
        if self.out.is_empty() || self.at_open() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    fn children(&mut self, el: ElementRef) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => self.text(&text.text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.element(child_el);
                    }
                }
                _ => {}
            }
        }
    }

    fn text(&mut self, raw: &str) {
        let collapsed = RE_WHITESPACE.replace_all(raw, " ");
        let mut text: &str = &collapsed;
        let line_start = self.at_line_start();
        if line_start || self.out.ends_with(' ') {
            text = text.trim_start();
        }
        if text.is_empty() {
            return;
        }

        let escaped = escape_text(text);
        if line_start {
            self.out.push_str(&RE_ENUM_MARKER.replace(&escaped, r"$1\."));
        } else {
            self.out.push_str(&escaped);
        }
    }

    fn element(&mut self, el: ElementRef) {
        let tag = el.value().name();
        let class = self.sheet.classes(tag, el.value().classes());

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<u8>().unwrap_or(1);
                self.heading(el, level, &class);
            }
            "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav"
            | "figure" | "details" | "summary" | "dl" | "dt" | "dd" => self.block(el, &class),
            "br" => self.out.push_str("#linebreak();"),
            "strong" | "b" => self.inline("strong", el, &class),
            "em" | "i" | "cite" => self.inline("emph", el, &class),
            "del" | "s" | "strike" => self.inline("strike", el, &class),
            "u" | "ins" => self.inline("underline", el, &class),
            "sub" => self.inline("sub", el, &class),
            "sup" => self.inline("super", el, &class),
            "mark" => self.inline("highlight", el, &class),
            "code" | "kbd" | "samp" | "tt" => self.code(el, &class),
            "pre" => self.pre(el),
            "a" => self.link(el, &class),
            "img" => {
                if let Some(alt) = el.value().attr("alt").filter(|a| !a.trim().is_empty()) {
                    self.out.push_str(&format!("#emph[{}];", escape_text(alt.trim())));
                }
            }
            "ul" => self.list(el, false),
            "ol" => self.list(el, true),
            "table" => self.table(el),
            "blockquote" => self.quote(el),
            "hr" => self.rule(),
            "span" | "label" | "abbr" | "small" | "big" => {
                self.open_inline(&class);
                self.children(el);
                self.close_inline(&class);
            }
            "script" | "style" | "head" | "title" | "meta" | "link" | "template" | "noscript" => {}
            other => {
                debug!("Lowering unknown element <{}> as its children", other);
                self.children(el);
            }
        }
    }

    fn open_inline(&mut self, style: &Style) {
        if style.float_right {
            self.out.push_str("#h(1fr);");
        }
        let args = style.text_args();
        if !args.is_empty() {
            self.open(&format!("#text({})[", args.join(", ")));
        }
    }

    fn close_inline(&mut self, style: &Style) {
        if style.has_text() {
            self.out.push_str("];");
        }
    }

    fn inline(&mut self, func: &str, el: ElementRef, class: &Style) {
        self.open_inline(class);
        self.open(&format!("#{func}["));
        self.children(el);
        self.out.push_str("];");
        self.close_inline(class);
    }

    fn code(&mut self, el: ElementRef, class: &Style) {
        let text: String = el.text().collect();
        self.open_inline(class);
        self.out
            .push_str(&format!("#raw(\"{}\");", escape_string(&text)));
        self.close_inline(class);
    }

    fn link(&mut self, el: ElementRef, class: &Style) {
        match el.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) {
            Some(href) => {
                self.open_inline(class);
                self.open(&format!("#link(\"{}\")[", escape_string(href)));
                self.children(el);
                self.out.push_str("];");
                self.close_inline(class);
            }
            None => {
                self.open_inline(class);
                self.children(el);
                self.close_inline(class);
            }
        }
    }

    fn block(&mut self, el: ElementRef, class: &Style) {
        self.block_break();
        let body = self.render_children(el);
        if body.is_empty() && !class.has_block() {
            return;
        }
        self.out.push_str(&wrap_block(body, class));
        self.block_break();
    }

    fn heading(&mut self, el: ElementRef, level: u8, class: &Style) {
        self.block_break();
        let mut body = self.render_children(el);
        let text = class.text_args();
        if !text.is_empty() {
            body = format!("#text({})[{body}];", text.join(", "));
        }
        let heading = format!("#heading(level: {level})[{body}];");
        let plain = Style {
            align: class.align,
            margin_top: class.margin_top.clone(),
            margin_bottom: class.margin_bottom.clone(),
            background: class.background.clone(),
            border: class.border.clone(),
            border_bottom: class.border_bottom.clone(),
            padding: class.padding.clone(),
            radius: class.radius.clone(),
            ..Style::default()
        };
        self.out.push_str(&wrap_block(heading, &plain));
        self.block_break();
    }

    fn pre(&mut self, el: ElementRef) {
        self.block_break();
        let text: String = el.text().collect();
        let text = text.strip_suffix('\n').unwrap_or(&text);
        self.out
            .push_str(&format!("#raw(block: true, \"{}\");", escape_string(text)));
        self.block_break();
    }

    fn quote(&mut self, el: ElementRef) {
        self.block_break();
        let body = self.render_children(el);
        self.out.push_str(&format!("#quote(block: true)[{body}];"));
        self.block_break();
    }

    fn rule(&mut self) {
        self.block_break();
        let style = self.sheet.get("hr").cloned().unwrap_or_default();
        // `border: 0; background: #ccc` is the usual way to draw a thin rule.
        let paint = [&style.background, &style.border, &style.border_bottom, &style.color]
            .into_iter()
            .flatten()
            .find(|p| p.as_str() != "none")
            .cloned();
        let line = match paint {
            Some(stroke) => format!("#line(length: 100%, stroke: {stroke});"),
            None => "#line(length: 100%);".to_string(),
        };
        let spacing = Style {
            margin_top: style.margin_top,
            margin_bottom: style.margin_bottom,
            ..Style::default()
        };
        self.out.push_str(&wrap_block(line, &spacing));
        self.block_break();
    }

    fn list(&mut self, el: ElementRef, ordered: bool) {
        let items: Vec<String> = el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(|li| format!("[{}]", self.render_children(li)))
            .collect();
        if items.is_empty() {
            return;
        }

        self.block_break();
        let func = if ordered { "enum" } else { "list" };
        self.out.push_str(&format!("#{func}(\n"));
        if ordered {
            let start = el
                .value()
                .attr("start")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|&s| s != 1);
            if let Some(start) = start {
                self.out.push_str(&format!("  start: {start},\n"));
            }
        }
        for item in items {
            self.out.push_str(&format!("  {item},\n"));
        }
        self.out.push_str(");");
        self.block_break();
    }

    fn table(&mut self, el: ElementRef) {
        let mut rows: Vec<(bool, ElementRef)> = Vec::new();
        collect_rows(el, false, &mut rows);
        if rows.is_empty() {
            return;
        }
        // Without a <thead>, a leading all-<th> row is the header.
        if !rows.iter().any(|(head, _)| *head) {
            let first_all_th = cells(rows[0].1)
                .all(|c| c.value().name() == "th");
            if first_all_th && cells(rows[0].1).next().is_some() {
                rows[0].0 = true;
            }
        }

        let columns = rows
            .iter()
            .map(|(_, tr)| cells(*tr).map(colspan).sum::<usize>())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return;
        }

        let full_width = self
            .sheet
            .get("table")
            .map(|s| s.full_width)
            .unwrap_or(false);
        let columns_arg = if full_width {
            format!("({})", vec!["1fr"; columns].join(", "))
        } else {
            columns.to_string()
        };

        let mut header = Vec::new();
        let mut body = Vec::new();
        for (is_header, tr) in &rows {
            let mut row: Vec<String> = cells(*tr).map(|c| self.cell(c)).collect();
            let used: usize = cells(*tr).map(colspan).sum();
            row.extend(std::iter::repeat("[]".to_string()).take(columns.saturating_sub(used)));
            if *is_header {
                header.extend(row);
            } else {
                body.extend(row);
            }
        }

        self.block_break();
        self.out.push_str("#table(\n");
        self.out.push_str(&format!("  columns: {columns_arg},\n"));
        if !header.is_empty() {
            self.out
                .push_str(&format!("  table.header({}),\n", header.join(", ")));
        }
        for chunk in body.chunks(columns) {
            self.out.push_str(&format!("  {},\n", chunk.join(", ")));
        }
        self.out.push_str(");");
        self.block_break();
    }

    fn cell(&self, cell: ElementRef) -> String {
        let tag = cell.value().name();
        let mut style = self.sheet.get(tag).cloned().unwrap_or_default();
        style.merge(&self.sheet.classes(tag, cell.value().classes()));
        if tag == "th" && style.bold.is_none() {
            style.bold = Some(true);
        }

        let mut body = self.render_children(cell);
        let text = style.text_args();
        if !text.is_empty() && !body.is_empty() {
            body = format!("#text({})[{body}];", text.join(", "));
        }

        let mut args = Vec::new();
        let span = colspan(cell);
        if span > 1 {
            args.push(format!("colspan: {span}"));
        }
        let align = cell
            .value()
            .attr("align")
            .or_else(|| inline_text_align(cell.value().attr("style")));
        if let Some(align @ ("left" | "center" | "right")) = align {
            args.push(format!("align: {align}"));
        }
        if let Some(ref fill) = style.background {
            args.push(format!("fill: {fill}"));
        }

        if args.is_empty() {
            format!("[{body}]")
        } else {
            format!("table.cell({})[{body}]", args.join(", "))
        }
    }
}

fn wrap_block(body: String, style: &Style) -> String {
    let mut body = body;
    let text = style.text_args();
    if !text.is_empty() {
        body = format!("#text({})[{body}];", text.join(", "));
    }
    let block = style.block_args();
    if !block.is_empty() {
        body = format!("#block({})[{body}];", block.join(", "));
    }
    if let Some(align) = style.align {
        body = format!("#align({})[{body}];", align.as_typst());
    } else if style.float_right {
        body = format!("#align(right)[{body}];");
    }
    body
}

fn collect_rows<'a>(el: ElementRef<'a>, in_head: bool, rows: &mut Vec<(bool, ElementRef<'a>)>) {
    for child in el.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => collect_rows(child, true, rows),
            "tbody" | "tfoot" => collect_rows(child, in_head, rows),
            "tr" => rows.push((in_head, child)),
            _ => {}
        }
    }
}

fn cells<'a>(tr: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "th" | "td"))
}

// Browsers clamp `colspan` to the same limit.
const MAX_COLSPAN: usize = 1000;

fn colspan(cell: ElementRef) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .map_or(1, |n| n.min(MAX_COLSPAN))
}

fn inline_text_align(style: Option<&str>) -> Option<&str> {
    style?
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(prop, _)| prop.trim() == "text-align")
        .map(|(_, value)| value.trim())
}

// ── Escaping ─────────────────────────────────────────────────────────────

/// Escape text for Typst markup mode.
///
/// Every character with markup meaning is backslash-escaped, including `/`
/// (so `//` in URLs never opens a comment) and the list/heading markers.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '*' | '_' | '`' | '[' | ']' | '{' | '}' | '$' | '@' | '<' | '>' | '~'
                | '/' | '=' | '+' | '-' | '"' | '\''
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text for a Typst string literal.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(css: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<title>T</title>\n<style>\n{css}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
        )
    }

    #[test]
    fn heading_and_strong() {
        let out = lower(&doc("", "<h1>Title</h1>\n<p>Hello <strong>world</strong></p>"));
        assert!(out.body.contains("#heading(level: 1)[Title];"), "got: {}", out.body);
        assert!(out.body.contains("Hello #strong[world];"), "got: {}", out.body);
    }

    #[test]
    fn title_goes_into_document_metadata() {
        let out = lower(&doc("", "<p>x</p>"));
        assert!(out.preamble.contains("#set document(title: \"T\")"));
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(escape_text("a_b*c#d"), "a\\_b\\*c\\#d");
        assert_eq!(escape_text("http://x"), "http:\\/\\/x");
        assert_eq!(escape_text("$5 [ok]"), "\\$5 \\[ok\\]");
    }

    #[test]
    fn numbered_line_start_is_not_a_list() {
        let out = lower(&doc("", "<p>2024. A year</p>"));
        assert!(out.body.starts_with("2024\\. A year"), "got: {}", out.body);
    }

    #[test]
    fn string_escape_handles_quotes_and_newlines() {
        assert_eq!(escape_string("a \"b\"\nc\\"), "a \\\"b\\\"\\nc\\\\");
    }

    #[test]
    fn literal_bracket_does_not_swallow_block_break() {
        let out = lower(&doc("", "Option [\n<div>next</div>"));
        assert!(out.body.contains("Option \\[\n\nnext"), "got: {}", out.body);
    }

    #[test]
    fn huge_colspan_is_clamped() {
        let html = "<table><tr><td colspan=\"1000000\">x</td></tr><tr><td>y</td></tr></table>";
        let out = lower(&doc("", html));
        assert!(out.body.contains("columns: 1000,"), "got: {}", out.body);
        assert!(out.body.contains("table.cell(colspan: 1000)[x]"), "got: {}", out.body);
        assert_eq!(out.body.matches("[]").count(), 999);
    }

    #[test]
    fn ordered_list_keeps_start() {
        let out = lower(&doc("", "<ol start=\"20\">\n<li>First</li>\n<li>Second</li>\n</ol>"));
        assert!(out.body.contains("#enum("), "got: {}", out.body);
        assert!(out.body.contains("start: 20,"), "got: {}", out.body);
        assert!(out.body.contains("[First],"), "got: {}", out.body);
    }

    #[test]
    fn unordered_list() {
        let out = lower(&doc("", "<ul><li>a</li><li>b</li></ul>"));
        assert!(out.body.contains("#list(\n  [a],\n  [b],\n);"), "got: {}", out.body);
    }

    #[test]
    fn table_with_header() {
        let html = "<table>\n<thead>\n<tr>\n<th>Field</th>\n<th>Type</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>_id</td>\n<td>ObjectId</td>\n</tr>\n</tbody>\n</table>";
        let out = lower(&doc("", html));
        assert!(out.body.contains("columns: 2,"), "got: {}", out.body);
        assert!(
            out.body.contains("table.header([#text(weight: \"bold\")[Field];], [#text(weight: \"bold\")[Type];]),"),
            "got: {}",
            out.body
        );
        assert!(out.body.contains("[\\_id], [ObjectId],"), "got: {}", out.body);
    }

    #[test]
    fn short_rows_are_padded() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>";
        let out = lower(&doc("", html));
        assert!(out.body.contains("[c], [],"), "got: {}", out.body);
    }

    #[test]
    fn full_width_table_uses_fractional_columns() {
        let html = "<table><tr><th>A</th><th>B</th></tr></table>";
        let out = lower(&doc("table { width: 100%; }", html));
        assert!(out.body.contains("columns: (1fr, 1fr),"), "got: {}", out.body);
    }

    #[test]
    fn page_and_body_rules_become_set_rules() {
        let css = "@page { size: A4; margin: 1in; }\nbody { font-size: 10pt; color: #34495e; line-height: 1.6; }";
        let out = lower(&doc(css, "<p>x</p>"));
        assert!(out.preamble.contains("#set page(paper: \"a4\", margin: 1in)"), "got: {}", out.preamble);
        assert!(out.preamble.contains("#set text(size: 10pt, fill: rgb(\"#34495e\"))"), "got: {}", out.preamble);
        assert!(out.preamble.contains("#set par(leading: 0.6em)"), "got: {}", out.preamble);
    }

    #[test]
    fn heading_rules_become_show_rules() {
        let css = "h1 { font-size: 18pt; text-align: center; }\nh2 { border-bottom: 1px solid #ccc; }";
        let out = lower(&doc(css, "<h1>x</h1>"));
        assert!(out.preamble.contains("#show heading.where(level: 1): set text(size: 18pt)"));
        assert!(out.preamble.contains("#show heading.where(level: 1): set align(center)"));
        assert!(out.preamble.contains(
            "#show heading.where(level: 2): it => block(stroke: (bottom: 0.75pt + rgb(\"#ccc\")), inset: (bottom: 3pt), width: 100%, it)"
        ));
    }

    #[test]
    fn floated_class_pushes_right() {
        let css = ".marks { float: right; font-size: 9pt; }";
        let out = lower(&doc(css, "<div>Explain joins. <span class=\"marks\">(5 marks)</span></div>"));
        assert!(
            out.body.contains("#h(1fr);#text(size: 9pt)[(5 marks)];"),
            "got: {}",
            out.body
        );
    }

    #[test]
    fn centered_class_wraps_block() {
        let css = ".header-info { text-align: center; }";
        let out = lower(&doc(css, "<p class=\"header-info\">Time: Two Hours</p>"));
        assert_eq!(out.body, "#align(center)[Time: Two Hours];");
    }

    #[test]
    fn line_break_and_code() {
        let out = lower(&doc("", "<p>one<br />\ntwo <code>a \"b\"</code></p>"));
        assert!(out.body.contains("one#linebreak(); two #raw(\"a \\\"b\\\"\");"), "got: {}", out.body);
    }

    #[test]
    fn pre_block_becomes_raw_block() {
        let out = lower(&doc("", "<pre><code>SELECT *\nFROM t;\n</code></pre>"));
        assert_eq!(out.body, "#raw(block: true, \"SELECT *\\nFROM t;\");");
    }

    #[test]
    fn style_and_script_are_not_rendered() {
        let out = lower(&doc("h1 { color: red; }", "<script>alert(1)</script><p>kept</p>"));
        assert_eq!(out.body, "kept");
    }

    #[test]
    fn links_keep_their_target() {
        let out = lower(&doc("", "<p><a href=\"https://example.com/a\">site</a></p>"));
        assert!(out.body.contains("#link(\"https://example.com/a\")[site];"), "got: {}", out.body);
    }

    #[test]
    fn rule_uses_background_when_border_is_removed() {
        let css = "hr { border: 0; height: 1px; background: #bdc3c7; margin: 25pt 0; }";
        let out = lower(&doc(css, "<hr>"));
        assert_eq!(
            out.body,
            "#block(above: 25pt, below: 25pt, width: 100%)[#line(length: 100%, stroke: rgb(\"#bdc3c7\"));];"
        );
    }

    #[test]
    fn lowering_is_deterministic() {
        let html = doc("h1 { color: red; }", "<h1>A</h1><ul><li>x</li></ul>");
        assert_eq!(lower(&html), lower(&html));
    }
}
