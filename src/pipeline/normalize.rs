//! Line-prefix normalisation: turn custom section markers into headings.
//!
//! Study notes often mark sections with a decorative token instead of
//! Markdown syntax (`🔹 Module 1: …`). Each [`PrefixRule`] names such a
//! prefix; a matching line is rewritten to `<marker> <line>` with the rule's
//! strip token removed. Every other line passes through byte-for-byte, so
//! running the normaliser twice never touches a line that didn't match.

use crate::config::PrefixRule;
use tracing::debug;

/// Rewrite every line matching a rule; leave the rest untouched.
///
/// Rules are tried in order and the first match wins.
pub fn normalize_lines<S: AsRef<str>>(lines: &[S], rules: &[PrefixRule]) -> Vec<String> {
    lines
        .iter()
        .map(|line| normalize_line(line.as_ref(), rules))
        .collect()
}

/// Apply [`normalize_lines`] to a whole text.
///
/// Splits on `'\n'` and joins with `'\n'`, so trailing newlines and any
/// `'\r'` characters survive unchanged.
pub fn normalize(text: &str, rules: &[PrefixRule]) -> String {
    if rules.is_empty() {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let out = normalize_lines(&lines, rules);
    let rewritten = lines
        .iter()
        .zip(&out)
        .filter(|(before, after)| **before != after.as_str())
        .count();
    debug!("Normalised {} of {} lines", rewritten, lines.len());
    out.join("\n")
}

fn normalize_line(line: &str, rules: &[PrefixRule]) -> String {
    match rules.iter().find(|r| line.starts_with(r.prefix.as_str())) {
        Some(rule) => {
            let body = match rule.strip.as_deref() {
                Some(token) if !token.is_empty() => line.replace(token, ""),
                _ => line.to_string(),
            };
            format!("{} {}", rule.marker(), body)
        }
        None => line.to_string(),
    }
}
