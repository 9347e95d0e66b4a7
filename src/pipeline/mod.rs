//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, and each
//! step runs exactly once per document. Keeping them apart means each is
//! tested on its own and the Markdown or PDF engine can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ normalize ──▶ markup ──▶ assemble ──▶ pdf
//! (text)     (prefixes)    (comrak)   (HTML shell)  (typst)
//! ```
//!
//! 1. [`normalize`] — rewrite custom section markers into Markdown headings
//! 2. [`markup`]    — render Markdown to an HTML fragment
//! 3. [`assemble`]  — wrap the fragment in the fixed document shell with
//!    stylesheet and header block
//! 4. [`pdf`]       — lay out the HTML/CSS and write PDF bytes to a sink;
//!    the only stage with I/O

pub mod assemble;
pub mod markup;
pub mod normalize;
pub mod pdf;
