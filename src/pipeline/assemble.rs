//! Document assembly: wrap an HTML fragment in the fixed document shell.
//!
//! The shell is one fixed layout: doctype, a single `<html>` root, a head
//! carrying the stylesheet, then the header block and the rendered content.
//! Header strings are escaped; the fragment and stylesheet are trusted and
//! inserted verbatim.

use crate::config::HeaderFields;

/// Build the complete HTML document.
pub fn assemble(fragment: &str, stylesheet: &str, header: &HeaderFields, page_title: &str) -> String {
    let mut html = String::with_capacity(fragment.len() + stylesheet.len() + 512);

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html>\n");
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(page_title)));
    html.push_str("<style>\n");
    html.push_str(stylesheet);
    if !stylesheet.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(&header_block(header));
    html.push_str(fragment);
    if !fragment.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</body>\n");
    html.push_str("</html>\n");

    html
}

fn header_block(header: &HeaderFields) -> String {
    if header.is_empty() {
        return String::new();
    }

    let mut block = String::new();
    if let Some(ref title) = header.title {
        block.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    }
    if let Some(ref course) = header.course {
        block.push_str(&format!(
            "<h2 class=\"course-title\">{}</h2>\n",
            escape_html(course)
        ));
    }
    for line in &header.info_lines {
        block.push_str(&format!(
            "<p class=\"header-info\">{}</p>\n",
            escape_html(line)
        ));
    }
    block.push_str("<hr>\n");
    block
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
