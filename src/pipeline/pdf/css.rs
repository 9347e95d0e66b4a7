//! A small CSS subset, resolved into Typst argument lists.
//!
//! Exam stylesheets are flat: element selectors, `.class` selectors, a few
//! comma-separated groups and one `@page` block. That is all this parser
//! understands. Anything else (descendant selectors, pseudo-elements,
//! nested at-rules, unknown properties) is skipped and logged at debug
//! level so the document still renders.
//!
//! Values are converted once, at parse time, into Typst syntax: `14px`
//! becomes `10.5pt`, `#ccc` becomes `rgb("#ccc")`, `1px solid #ccc` becomes
//! `0.75pt + rgb("#ccc")`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Horizontal alignment understood by Typst's `align`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_typst(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// Resolved declarations for one selector, already in Typst syntax.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub font_size: Option<String>,
    pub color: Option<String>,
    pub italic: Option<bool>,
    pub bold: Option<bool>,
    pub font_family: Vec<String>,
    pub align: Option<Align>,
    pub justify: bool,
    pub leading: Option<String>,
    pub margin: Option<String>,
    pub margin_top: Option<String>,
    pub margin_bottom: Option<String>,
    pub margin_left: Option<String>,
    pub background: Option<String>,
    pub border: Option<String>,
    pub border_bottom: Option<String>,
    pub padding: Option<String>,
    pub radius: Option<String>,
    pub float_right: bool,
    pub full_width: bool,
    pub paper: Option<&'static str>,
}

impl Style {
    /// Arguments for Typst's `text` function.
    pub fn text_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref size) = self.font_size {
            args.push(format!("size: {size}"));
        }
        if let Some(ref color) = self.color {
            args.push(format!("fill: {color}"));
        }
        match self.italic {
            Some(true) => args.push("style: \"italic\"".to_string()),
            Some(false) => args.push("style: \"normal\"".to_string()),
            None => {}
        }
        match self.bold {
            Some(true) => args.push("weight: \"bold\"".to_string()),
            Some(false) => args.push("weight: \"regular\"".to_string()),
            None => {}
        }
        if !self.font_family.is_empty() {
            let families = self
                .font_family
                .iter()
                .map(|f| format!("\"{f}\""))
                .collect::<Vec<_>>()
                .join(", ");
            args.push(format!("font: ({families},)"));
        }
        args
    }

    /// Arguments for Typst's `block` function: spacing, fill, stroke, inset.
    pub fn block_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref above) = self.margin_top {
            args.push(format!("above: {above}"));
        }
        if let Some(ref below) = self.margin_bottom {
            args.push(format!("below: {below}"));
        }
        if let Some(ref fill) = self.background {
            args.push(format!("fill: {fill}"));
        }
        match (&self.border, &self.border_bottom) {
            (Some(all), _) => args.push(format!("stroke: {all}")),
            (None, Some(bottom)) => args.push(format!("stroke: (bottom: {bottom})")),
            (None, None) => {}
        }
        if let Some(ref inset) = self.padding {
            args.push(format!("inset: {inset}"));
        } else if self.border_bottom.is_some() {
            args.push("inset: (bottom: 3pt)".to_string());
        }
        if let Some(ref radius) = self.radius {
            args.push(format!("radius: {radius}"));
        }
        if !args.is_empty() {
            args.push("width: 100%".to_string());
        }
        args
    }

    /// `true` when the style changes anything about text.
    pub fn has_text(&self) -> bool {
        !self.text_args().is_empty()
    }

    /// `true` when the style needs a wrapping block.
    pub fn has_block(&self) -> bool {
        !self.block_args().is_empty()
    }

    /// Overlay `other` on top of `self`; set fields of `other` win.
    pub fn merge(&mut self, other: &Style) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })*
            };
        }
        take!(
            font_size, color, italic, bold, align, leading, margin, margin_top,
            margin_bottom, margin_left, background, border, border_bottom, padding,
            radius, paper
        );
        if !other.font_family.is_empty() {
            self.font_family = other.font_family.clone();
        }
        self.justify |= other.justify;
        self.float_right |= other.float_right;
        self.full_width |= other.full_width;
    }

    fn apply(&mut self, property: &str, value: &str) {
        let value = value.trim().trim_end_matches("!important").trim();
        match property {
            "font-size" => self.font_size = length(value),
            "color" => self.color = color(value),
            "font-style" => self.italic = Some(matches!(value, "italic" | "oblique")),
            "font-weight" => {
                self.bold = Some(match value {
                    "bold" | "bolder" => true,
                    v => v.parse::<u32>().map(|w| w >= 600).unwrap_or(false),
                })
            }
            "font-family" => self.font_family = font_families(value),
            "text-align" => match value {
                "center" => self.align = Some(Align::Center),
                "right" => self.align = Some(Align::Right),
                "left" => self.align = Some(Align::Left),
                "justify" => self.justify = true,
                _ => {}
            },
            "line-height" => self.leading = leading(value),
            "margin" => {
                self.margin = box_shorthand(value);
                let parts: Vec<&str> = value.split_whitespace().collect();
                let (top, bottom) = match parts.as_slice() {
                    [all] => (*all, *all),
                    [y, _] => (*y, *y),
                    [t, _, b] | [t, _, b, _] => (*t, *b),
                    _ => return,
                };
                self.margin_top = spacing(top);
                self.margin_bottom = spacing(bottom);
            }
            "margin-top" => self.margin_top = spacing(value),
            "margin-bottom" => self.margin_bottom = spacing(value),
            "margin-left" => self.margin_left = spacing(value),
            "background" | "background-color" => self.background = color(value),
            "border" => self.border = stroke(value),
            "border-bottom" => self.border_bottom = stroke(value),
            "padding" => self.padding = box_shorthand(value),
            "border-radius" => self.radius = length(value),
            "float" => self.float_right = value == "right",
            "width" => self.full_width = value == "100%",
            "size" => self.paper = paper(value),
            other => debug!("Ignoring unsupported CSS property '{}'", other),
        }
    }
}

/// Parsed stylesheet: one merged [`Style`] per simple selector.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: HashMap<String, Style>,
}

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

// `h1`, `.marks`, `h2.course-title`, `@page`
static RE_SIMPLE_SELECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@page|[a-z][a-z0-9]*|[a-z0-9]*\.[a-z0-9_-]+)$").unwrap());

impl Stylesheet {
    /// Parse CSS text. Never fails; unsupported constructs are skipped.
    pub fn parse(css: &str) -> Self {
        let css = RE_COMMENT.replace_all(css, "");
        let mut rules: HashMap<String, Style> = HashMap::new();
        let mut rest: &str = &css;

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let Some(close) = matching_brace(&rest[open..]) else {
                debug!("Unterminated CSS block after '{}'", prelude);
                break;
            };
            let body = &rest[open + 1..open + close];
            rest = &rest[open + close + 1..];

            if body.contains('{') {
                debug!("Skipping nested CSS block '{}'", prelude);
                continue;
            }

            let mut style = Style::default();
            for decl in body.split(';') {
                if let Some((prop, value)) = decl.split_once(':') {
                    style.apply(&prop.trim().to_lowercase(), value);
                }
            }

            for selector in prelude.split(',') {
                let selector = selector.trim().to_lowercase();
                if RE_SIMPLE_SELECTOR.is_match(&selector) {
                    rules.entry(selector).or_default().merge(&style);
                } else {
                    debug!("Ignoring unsupported CSS selector '{}'", selector);
                }
            }
        }

        Self { rules }
    }

    /// Style for an element or `@page` selector.
    pub fn get(&self, selector: &str) -> Option<&Style> {
        self.rules.get(selector)
    }

    /// Merged style of an element's classes: `.class` then `tag.class`.
    pub fn classes<'a>(&self, tag: &str, classes: impl Iterator<Item = &'a str>) -> Style {
        let mut style = Style::default();
        for class in classes {
            let class = class.to_lowercase();
            if let Some(s) = self.rules.get(&format!(".{class}")) {
                style.merge(s);
            }
            if let Some(s) = self.rules.get(&format!("{tag}.{class}")) {
                style.merge(s);
            }
        }
        style
    }
}

/// Offset of the `}` closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ── Value conversion ─────────────────────────────────────────────────────

static RE_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9]*\.?[0-9]+)(pt|px|in|cm|mm|em|%)?$").unwrap());

/// CSS length → Typst length. Unitless values other than `0` are rejected.
///
/// Percentages become `em`: Typst has no ratio form for font sizes, leading
/// or stroke widths.
pub fn length(value: &str) -> Option<String> {
    let caps = RE_LENGTH.captures(value.trim())?;
    let number: f64 = caps[1].parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str());
    match unit {
        Some("px") => Some(format!("{}pt", trim_float(number * 0.75))),
        Some("%") => Some(format!("{}em", trim_float(number / 100.0))),
        Some(u) => Some(format!("{}{}", trim_float(number), u)),
        None if number == 0.0 => Some("0pt".to_string()),
        None => None,
    }
}

/// Non-negative length for spacing; Typst rejects negative block spacing.
fn spacing(value: &str) -> Option<String> {
    length(value).filter(|l| !l.starts_with('-'))
}

/// `line-height` → paragraph leading. A multiplier `n` (or `n * 100%`)
/// becomes `(n - 1)em`.
fn leading(value: &str) -> Option<String> {
    let factor = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => value.parse::<f64>().ok(),
    };
    match factor {
        Some(factor) => Some(format!("{}em", trim_float((factor - 1.0).max(0.0)))),
        None => length(value),
    }
}

/// One to four CSS box values → a Typst length or dictionary.
fn box_shorthand(value: &str) -> Option<String> {
    let parts: Vec<String> = value
        .split_whitespace()
        .map(|p| spacing(p))
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [all] => Some(all.clone()),
        [y, x] => Some(format!("(y: {y}, x: {x})")),
        [t, x, b] => Some(format!("(top: {t}, x: {x}, bottom: {b})")),
        [t, r, b, l] => Some(format!("(top: {t}, right: {r}, bottom: {b}, left: {l})")),
        _ => None,
    }
}

static RE_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

static RE_RGB_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgb\(\s*([0-9]{1,3})\s*,\s*([0-9]{1,3})\s*,\s*([0-9]{1,3})\s*\)$").unwrap()
});

/// CSS colour → Typst colour expression.
pub fn color(value: &str) -> Option<String> {
    let value = value.trim();
    if RE_HEX.is_match(value) {
        return Some(format!("rgb(\"{value}\")"));
    }
    if let Some(caps) = RE_RGB_FN.captures(value) {
        let channels: Vec<u8> = (1..=3)
            .filter_map(|i| caps[i].parse::<u16>().ok())
            .map(|c| c.min(255) as u8)
            .collect();
        return Some(format!("rgb({}, {}, {})", channels[0], channels[1], channels[2]));
    }
    let named = match value.to_lowercase().as_str() {
        "black" => "black",
        "white" => "white",
        "gray" | "grey" => "gray",
        "silver" => "silver",
        "red" => "red",
        "maroon" => "maroon",
        "green" => "green",
        "lime" => "lime",
        "blue" => "blue",
        "navy" => "navy",
        "teal" => "teal",
        "aqua" => "aqua",
        "purple" => "purple",
        "fuchsia" => "fuchsia",
        "orange" => "orange",
        "yellow" => "yellow",
        "olive" => "olive",
        _ => return None,
    };
    Some(named.to_string())
}

/// `1px solid #ccc` → `0.75pt + rgb("#ccc")`. `0` and `none` → `none`.
pub fn stroke(value: &str) -> Option<String> {
    let value = value.trim();
    if value == "0" || value == "none" {
        return Some("none".to_string());
    }

    let mut thickness = None;
    let mut paint = None;
    for token in value.split_whitespace() {
        if let Some(l) = length(token) {
            thickness = Some(l);
        } else if let Some(c) = color(token) {
            paint = Some(c);
        }
    }
    match (thickness, paint) {
        (Some(t), Some(p)) => Some(format!("{t} + {p}")),
        (Some(t), None) => Some(t),
        (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

fn paper(value: &str) -> Option<&'static str> {
    let size = value.split_whitespace().next()?.to_lowercase();
    match size.as_str() {
        "a3" => Some("a3"),
        "a4" => Some("a4"),
        "a5" => Some("a5"),
        "letter" => Some("us-letter"),
        "legal" => Some("us-legal"),
        _ => None,
    }
}

/// Keep families Typst can look up; map generic `monospace` to the bundled
/// mono font and drop the other generic keywords.
fn font_families(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|f| !f.is_empty())
        .filter_map(|f| match f.to_lowercase().as_str() {
            "monospace" => Some("DejaVu Sans Mono".to_string()),
            "serif" | "sans-serif" | "cursive" | "fantasy" | "system-ui" => None,
            _ => Some(f.to_string()),
        })
        .collect()
}

fn trim_float(n: f64) -> String {
    let s = format!("{:.2}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAM_CSS: &str = r#"
        @page { size: A4; margin: 1in; }
        body { font-family: 'DejaVu Sans', sans-serif; font-size: 10pt; color: #34495e; line-height: 1.6; }
        /* Main title */
        h1 { font-size: 18pt; text-align: center; color: #2E86C1; }
        h2 { font-size: 14pt; border-bottom: 1px solid #ccc; padding-bottom: 4px; }
        h2.course-title { text-align: center; }
        .marks { font-size: 9pt; color: #7f8c8d; float: right; }
        .question-with-marks::after { content: ""; display: table; }
        th, td { border: 1px solid black; padding: 12px; }
    "#;

    #[test]
    fn parses_element_and_page_rules() {
        let sheet = Stylesheet::parse(EXAM_CSS);
        let page = sheet.get("@page").unwrap();
        assert_eq!(page.paper, Some("a4"));
        assert_eq!(page.margin.as_deref(), Some("1in"));

        let body = sheet.get("body").unwrap();
        assert_eq!(body.font_size.as_deref(), Some("10pt"));
        assert_eq!(body.color.as_deref(), Some("rgb(\"#34495e\")"));
        assert_eq!(body.leading.as_deref(), Some("0.6em"));
        assert_eq!(body.font_family, vec!["DejaVu Sans".to_string()]);

        let h1 = sheet.get("h1").unwrap();
        assert_eq!(h1.align, Some(Align::Center));
    }

    #[test]
    fn grouped_selectors_share_declarations() {
        let sheet = Stylesheet::parse(EXAM_CSS);
        let th = sheet.get("th").unwrap();
        let td = sheet.get("td").unwrap();
        assert_eq!(th, td);
        assert_eq!(th.border.as_deref(), Some("0.75pt + black"));
        assert_eq!(th.padding.as_deref(), Some("9pt"));
    }

    #[test]
    fn class_rules_merge_plain_and_qualified() {
        let sheet = Stylesheet::parse(EXAM_CSS);
        let marks = sheet.classes("span", ["marks"].into_iter());
        assert!(marks.float_right);
        assert_eq!(marks.font_size.as_deref(), Some("9pt"));

        let course = sheet.classes("h2", ["course-title"].into_iter());
        assert_eq!(course.align, Some(Align::Center));
    }

    #[test]
    fn pseudo_elements_are_ignored() {
        let sheet = Stylesheet::parse(EXAM_CSS);
        assert!(sheet.get(".question-with-marks::after").is_none());
    }

    #[test]
    fn nested_at_rules_are_skipped() {
        let sheet = Stylesheet::parse("@media print { h1 { color: red; } } h2 { color: blue; }");
        assert!(sheet.get("h1").is_none());
        assert_eq!(sheet.get("h2").unwrap().color.as_deref(), Some("blue"));
    }

    #[test]
    fn later_declarations_win() {
        let sheet = Stylesheet::parse("h1 { color: red; } h1 { color: #000000; }");
        assert_eq!(sheet.get("h1").unwrap().color.as_deref(), Some("rgb(\"#000000\")"));
    }

    #[test]
    fn length_conversion() {
        assert_eq!(length("12px").as_deref(), Some("9pt"));
        assert_eq!(length("14px").as_deref(), Some("10.5pt"));
        assert_eq!(length("1in").as_deref(), Some("1in"));
        assert_eq!(length("0").as_deref(), Some("0pt"));
        assert_eq!(length("-5pt").as_deref(), Some("-5pt"));
        assert_eq!(length("12"), None);
        assert_eq!(length("auto"), None);
        assert_eq!(spacing("-5pt"), None);
    }

    #[test]
    fn percentages_become_em() {
        assert_eq!(length("120%").as_deref(), Some("1.2em"));
        assert_eq!(leading("150%").as_deref(), Some("0.5em"));
        assert_eq!(leading("1.6").as_deref(), Some("0.6em"));
        assert_eq!(leading("90%").as_deref(), Some("0em"));

        let sheet = Stylesheet::parse("body { font-size: 120%; line-height: 150%; }");
        let body = sheet.get("body").unwrap();
        assert_eq!(body.font_size.as_deref(), Some("1.2em"));
        assert_eq!(body.leading.as_deref(), Some("0.5em"));
    }

    #[test]
    fn color_conversion() {
        assert_eq!(color("#ccc").as_deref(), Some("rgb(\"#ccc\")"));
        assert_eq!(color("rgb(10, 20, 300)").as_deref(), Some("rgb(10, 20, 255)"));
        assert_eq!(color("Grey").as_deref(), Some("gray"));
        assert_eq!(color("currentColor"), None);
    }

    #[test]
    fn stroke_conversion() {
        assert_eq!(stroke("1px solid #ccc").as_deref(), Some("0.75pt + rgb(\"#ccc\")"));
        assert_eq!(stroke("0").as_deref(), Some("none"));
        assert_eq!(stroke("dashed").as_deref(), None);
    }

    #[test]
    fn box_shorthand_forms() {
        assert_eq!(box_shorthand("10px").as_deref(), Some("7.5pt"));
        assert_eq!(box_shorthand("2px 4px").as_deref(), Some("(y: 1.5pt, x: 3pt)"));
        assert_eq!(box_shorthand("25pt 0").as_deref(), Some("(y: 25pt, x: 0pt)"));
    }

    #[test]
    fn text_args_render_in_stable_order() {
        let sheet = Stylesheet::parse(".x { color: red; font-size: 9pt; font-style: italic; font-weight: 700; }");
        let style = sheet.get(".x").unwrap();
        assert_eq!(
            style.text_args(),
            vec!["size: 9pt", "fill: red", "style: \"italic\"", "weight: \"bold\""]
        );
    }

    #[test]
    fn garbage_css_does_not_panic() {
        let sheet = Stylesheet::parse("}{ :; h1 { color: ; font-size: big } {{");
        assert!(sheet.get("h1").map(|s| s.color.is_none()).unwrap_or(true));
    }
}
