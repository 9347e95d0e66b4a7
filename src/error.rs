//! Error types for the exam2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Exam2PdfError`] — **Fatal**: the pipeline cannot produce an artifact
//!   at all (output file cannot be opened, bad configuration, unreadable
//!   input). Returned as `Err(Exam2PdfError)` from the `convert*` functions.
//!
//! * [`EngineError`] — **Non-fatal**: the PDF engine ran but reported a
//!   problem (compile diagnostics, export failure, a sink that refused the
//!   bytes). Stored inside [`crate::pipeline::pdf::RenderStatus`] so the
//!   caller reports it and carries on. Nothing is retried and a partially
//!   written file is left in place.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the exam2pdf library.
///
/// Engine-level failures use [`EngineError`] and are stored in
/// [`crate::pipeline::pdf::RenderStatus`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Exam2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The Markdown source could not be read.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output file could not be created or opened for writing.
    #[error("Failed to open output file '{path}': {source}")]
    OutputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A markup extension name was not recognised.
    #[error("Unknown markup extension '{name}'\nKnown extensions: tables, fenced-code, line-breaks")]
    UnknownExtension { name: String },

    /// No built-in profile carries this name.
    #[error("Unknown profile '{name}'\nRun with --list-profiles to see the built-in profiles.")]
    UnknownProfile { name: String },
}

/// A non-fatal error reported by the PDF engine.
///
/// Carried inside [`crate::pipeline::pdf::RenderStatus`]. The caller prints
/// it and the invocation ends normally.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EngineError {
    /// The generated Typst document failed to compile.
    #[error("layout failed: {detail}")]
    Compile { detail: String },

    /// The laid-out document could not be exported as PDF.
    #[error("PDF export failed: {detail}")]
    Export { detail: String },

    /// The PDF bytes could not be written to the sink.
    #[error("writing PDF bytes failed: {detail}")]
    Sink { detail: String },
}
