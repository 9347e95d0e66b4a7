//! # exam2pdf
//!
//! Render exam papers and study notes written in Markdown to styled PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Normalize  custom section markers (🔹 Module …) → headings
//!  ├─ 2. Markup     Markdown → HTML fragment (comrak; tables, fences, breaks)
//!  ├─ 3. Assemble   fixed HTML shell: <style>, header block, content
//!  └─ 4. PDF        HTML + CSS subset → Typst → PDF bytes (typst, typst-pdf)
//! ```
//!
//! Every stage is synchronous and runs once per document. Stages 1–3 are
//! pure; identical input always yields identical HTML. Stage 4 reports
//! engine problems in a [`RenderStatus`] instead of failing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exam2pdf::{run, Profile};
//!
//! let source = std::fs::read_to_string("paper.md").unwrap();
//! let config = Profile::ExamPaper.config_builder(source).build().unwrap();
//! let outcome = run(&config, Profile::ExamPaper.default_output());
//! println!("{}", outcome.message());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `exam2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! exam2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod profiles;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentConfig, DocumentConfigBuilder, Extensions, HeaderFields, PrefixRule};
pub use convert::{convert_to_file, render_html, render_pdf, run, RunOutcome};
pub use error::{EngineError, Exam2PdfError};
pub use output::{RenderReport, StageTimings};
pub use pipeline::markup::{ComrakRenderer, MarkupRenderer};
pub use pipeline::pdf::{PdfEngine, RenderStatus, TypstEngine};
pub use profiles::Profile;
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback, Stage};
