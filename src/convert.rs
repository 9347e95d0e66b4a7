//! Conversion entry points.
//!
//! Every function here runs the same four stages in order (normalize,
//! markup, assemble, pdf) and differs only in where the result goes:
//!
//! * [`render_html`]      — stop after assembly, return the HTML document
//! * [`render_pdf`]       — write PDF bytes to any `Write` sink
//! * [`convert_to_file`]  — create a file and return a [`RenderReport`]
//! * [`run`]              — like `convert_to_file`, but never fails; returns
//!   a [`RunOutcome`] holding the console line to print
//!
//! The `*_with` variants take an explicit [`PdfEngine`]; the others use the
//! shared [`TypstEngine`].

use crate::config::DocumentConfig;
use crate::error::Exam2PdfError;
use crate::output::{RenderReport, StageTimings};
use crate::pipeline::pdf::{self, PdfEngine, RenderStatus, TypstEngine};
use crate::pipeline::{assemble, markup, normalize};
use crate::progress::Stage;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// Run the text stages and return the complete HTML document.
///
/// Deterministic: equal configs always produce byte-identical HTML.
pub fn render_html(config: &DocumentConfig) -> String {
    build_html(config, &mut StageTimings::default())
}

/// Render `config` to PDF bytes on `sink` with the shared Typst engine.
pub fn render_pdf(config: &DocumentConfig, sink: &mut dyn Write) -> RenderStatus {
    render_pdf_with(config, TypstEngine::shared(), sink)
}

/// Render `config` to PDF bytes on `sink` with `engine`.
pub fn render_pdf_with(
    config: &DocumentConfig,
    engine: &dyn PdfEngine,
    sink: &mut dyn Write,
) -> RenderStatus {
    let html = build_html(config, &mut StageTimings::default());
    let (status, _) = timed(config, Stage::Pdf, || engine.render(&html, sink));
    report_engine_error(config, &status);
    status
}

/// Render `config` into the file at `path`.
///
/// # Errors
/// Returns `Err` only when the output file cannot be created. Engine
/// failures are reported in [`RenderReport::engine_error`] and leave the
/// file in place, possibly empty.
pub fn convert_to_file(
    config: &DocumentConfig,
    path: impl AsRef<Path>,
) -> Result<RenderReport, Exam2PdfError> {
    convert_to_file_with(config, TypstEngine::shared(), path)
}

/// [`convert_to_file`] with an explicit engine.
pub fn convert_to_file_with(
    config: &DocumentConfig,
    engine: &dyn PdfEngine,
    path: impl AsRef<Path>,
) -> Result<RenderReport, Exam2PdfError> {
    let total_start = Instant::now();
    let path = path.as_ref();
    info!("Rendering {} → {}", config.page_title, path.display());

    let mut timings = StageTimings::default();
    let html = build_html(config, &mut timings);

    let (status, pdf_ms) = timed(config, Stage::Pdf, || {
        pdf::render_to_path(engine, &html, path)
    });
    let status = status?;
    timings.pdf_ms = pdf_ms;
    timings.total_ms = total_start.elapsed().as_millis() as u64;
    report_engine_error(config, &status);

    let absolute_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!(
        "Wrote {} bytes to {} in {}ms",
        status.bytes_written,
        absolute_path.display(),
        timings.total_ms
    );

    let warnings = status
        .log
        .iter()
        .filter_map(|l| l.strip_prefix("warning: "))
        .map(str::to_string)
        .collect();

    Ok(RenderReport {
        output_path: path.to_path_buf(),
        absolute_path,
        bytes_written: status.bytes_written,
        html_bytes: html.len(),
        timings,
        warnings,
        engine_error: status.error,
    })
}

/// Final state of one invocation, ready to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// The PDF was written.
    Created { path: PathBuf },
    /// The engine reported a problem; the file may be empty.
    EngineFailed { detail: String },
    /// Anything else went wrong, e.g. the output could not be opened.
    Failed { detail: String },
}

impl RunOutcome {
    /// The one console line describing this outcome.
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Created { path } => {
                format!("✔ PDF created successfully: {}", path.display())
            }
            RunOutcome::EngineFailed { detail } => {
                format!("✘ Error during PDF creation: {detail}")
            }
            RunOutcome::Failed { detail } => format!("✘ An unexpected error occurred: {detail}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Created { .. })
    }

    /// Classify the result of [`convert_to_file`].
    pub fn from_result(result: &Result<RenderReport, Exam2PdfError>) -> Self {
        match result {
            Ok(report) => match report.engine_error {
                None => RunOutcome::Created {
                    path: report.absolute_path.clone(),
                },
                Some(ref err) => RunOutcome::EngineFailed {
                    detail: err.to_string(),
                },
            },
            Err(err) => RunOutcome::Failed {
                detail: err.to_string(),
            },
        }
    }
}

/// Render to `path` and fold every failure into a [`RunOutcome`].
///
/// Never panics on I/O problems and never returns an error: the caller
/// prints [`RunOutcome::message`] and carries on.
pub fn run(config: &DocumentConfig, path: impl AsRef<Path>) -> RunOutcome {
    run_with(config, TypstEngine::shared(), path)
}

/// [`run`] with an explicit engine.
pub fn run_with(config: &DocumentConfig, engine: &dyn PdfEngine, path: impl AsRef<Path>) -> RunOutcome {
    let result = convert_to_file_with(config, engine, path);
    if let Err(ref err) = result {
        error!("Conversion failed: {}", err);
    }
    RunOutcome::from_result(&result)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Stages 1–3. Fills the matching fields of `timings`.
fn build_html(config: &DocumentConfig, timings: &mut StageTimings) -> String {
    let (normalized, ms) = timed(config, Stage::Normalize, || {
        normalize::normalize(&config.source, &config.prefix_rules)
    });
    timings.normalize_ms = ms;

    let (fragment, ms) = timed(config, Stage::Markup, || {
        markup::render_markup(&normalized, &config.extensions)
    });
    timings.markup_ms = ms;

    let (html, ms) = timed(config, Stage::Assemble, || {
        assemble::assemble(&fragment, &config.stylesheet, &config.header, &config.page_title)
    });
    timings.assemble_ms = ms;

    debug!(
        "Assembled {} bytes of HTML from {} bytes of source",
        html.len(),
        config.source.len()
    );
    html
}

/// Run one stage, firing progress callbacks around it.
fn timed<T>(config: &DocumentConfig, stage: Stage, f: impl FnOnce() -> T) -> (T, u64) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let out = f();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!("Stage '{}' finished in {}ms", stage, elapsed_ms);
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, elapsed_ms);
    }
    (out, elapsed_ms)
}

fn report_engine_error(config: &DocumentConfig, status: &RenderStatus) {
    if let Some(ref err) = status.error {
        if let Some(ref cb) = config.progress_callback {
            cb.on_engine_error(&err.to_string());
        }
    }
}
