//! PDF rendering: assembled HTML document → PDF bytes.
//!
//! [`PdfEngine`] is the seam; [`TypstEngine`] is the implementation the
//! pipeline uses. It lowers the HTML to Typst markup ([`lower`]), honouring a
//! subset of the embedded CSS ([`css`]), then lays out and exports the
//! document with `typst` and `typst-pdf` using the fonts bundled in
//! `typst-assets`.
//!
//! Engine problems are not errors in the `Result` sense. They are reported
//! in the returned [`RenderStatus`] and the caller decides what to print.
//! Only failing to open the output file is fatal.

pub mod css;
pub mod lower;

use crate::error::{EngineError, Exam2PdfError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, error, warn};

use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};

/// Result of one engine run.
///
/// `error` is `None` on success. `log` collects engine warnings and, on
/// failure, the diagnostics that caused it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStatus {
    pub error: Option<EngineError>,
    pub log: Vec<String>,
    pub bytes_written: u64,
}

impl RenderStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn fail(&mut self, err: EngineError) {
        error!("PDF engine failed: {}", err);
        self.log.push(format!("error: {err}"));
        self.error = Some(err);
    }
}

/// Capability: turn a complete HTML document into PDF bytes on a sink.
pub trait PdfEngine: Send + Sync {
    fn render(&self, html: &str, sink: &mut dyn Write) -> RenderStatus;
}

// ── Typst engine ─────────────────────────────────────────────────────────

// Fixed so that identical input always produces identical output.
const DOCUMENT_DATE: (i32, u8, u8) = (2024, 1, 1);

static SHARED: Lazy<TypstEngine> = Lazy::new(TypstEngine::new);

/// Typst-backed [`PdfEngine`].
///
/// Construction parses every bundled font, so reuse one engine (or
/// [`TypstEngine::shared`]) across documents.
pub struct TypstEngine {
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl TypstEngine {
    pub fn new() -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .filter_map(|data| Font::new(Bytes::new(data), 0))
            .collect();

        let mut book = FontBook::new();
        for font in &fonts {
            book.push(font.info().clone());
        }
        debug!("Loaded {} bundled fonts", fonts.len());

        Self {
            library: LazyHash::new(Library::builder().build()),
            book: LazyHash::new(book),
            fonts,
        }
    }

    /// Process-wide engine, built on first use.
    pub fn shared() -> &'static TypstEngine {
        &SHARED
    }

    /// Lay out Typst source and export it as PDF bytes.
    ///
    /// Warnings are logged and appended to `log` whatever the outcome.
    pub fn compile(&self, source: String, log: &mut Vec<String>) -> Result<Vec<u8>, EngineError> {
        let world = DocumentWorld::new(self, source);
        let warned = typst::compile(&world);

        for warning in &warned.warnings {
            warn!("Typst warning: {}", warning.message);
            log.push(format!("warning: {}", warning.message));
        }

        let document = warned.output.map_err(|errors| EngineError::Compile {
            detail: join_messages(errors.iter().map(|e| e.message.to_string())),
        })?;

        typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default()).map_err(|errors| {
            EngineError::Export {
                detail: join_messages(errors.iter().map(|e| e.message.to_string())),
            }
        })
    }
}

impl Default for TypstEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfEngine for TypstEngine {
    fn render(&self, html: &str, sink: &mut dyn Write) -> RenderStatus {
        let mut status = RenderStatus::default();
        let document = lower::lower(html);

        match self.compile(document.source(), &mut status.log) {
            Ok(bytes) => match sink.write_all(&bytes).and_then(|_| sink.flush()) {
                Ok(()) => {
                    status.bytes_written = bytes.len() as u64;
                    debug!("Wrote {} PDF bytes", bytes.len());
                }
                Err(e) => status.fail(EngineError::Sink {
                    detail: e.to_string(),
                }),
            },
            Err(err) => status.fail(err),
        }

        status
    }
}

fn join_messages(messages: impl Iterator<Item = String>) -> String {
    messages.collect::<Vec<_>>().join(", ")
}

/// Single-file world: the lowered document is the only source; no images,
/// no packages, no system fonts.
struct DocumentWorld<'a> {
    engine: &'a TypstEngine,
    main: Source,
}

impl<'a> DocumentWorld<'a> {
    fn new(engine: &'a TypstEngine, content: String) -> Self {
        let id = FileId::new(None, VirtualPath::new("main.typ"));
        Self {
            engine,
            main: Source::new(id, content),
        }
    }
}

impl World for DocumentWorld<'_> {
    fn library(&self) -> &LazyHash<Library> {
        &self.engine.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.engine.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.engine.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let (year, month, day) = DOCUMENT_DATE;
        Datetime::from_ymd(year, month, day)
    }
}

// ── File output ──────────────────────────────────────────────────────────

/// Create `path` and render into it.
///
/// Only a failure to create the file is returned as `Err`. Engine failures
/// come back in the status and leave whatever was written (usually nothing)
/// in place. The file handle is closed when this function returns.
pub fn render_to_path(
    engine: &dyn PdfEngine,
    html: &str,
    path: &Path,
) -> Result<RenderStatus, Exam2PdfError> {
    let file = File::create(path).map_err(|source| Exam2PdfError::OutputOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let mut status = engine.render(html, &mut writer);

    if let Err(e) = writer.flush() {
        if status.is_ok() {
            status.fail(EngineError::Sink {
                detail: e.to_string(),
            });
        }
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const PLAIN: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>Doc</title>\n<style>\n</style>\n</head>\n<body>\n<p>Just some prose.</p>\n</body>\n</html>\n";

    const STYLED: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Exam Paper</title>
<style>
@page { size: A4; margin: 1in; }
body { font-size: 10pt; color: #34495e; line-height: 1.6; }
h1 { font-size: 18pt; text-align: center; color: #2E86C1; }
h2 { font-size: 14pt; border-bottom: 1px solid #ccc; }
.marks { float: right; font-size: 9pt; color: #7f8c8d; }
th, td { border: 1px solid black; padding: 6px; }
code { background-color: #eee; }
</style>
</head>
<body>
<h1>FOURTH SEMESTER EXAMINATION</h1>
<h2 class="course-title">BCA4B05 — DBMS &amp; RDBMS</h2>
<hr>
<ol start="20">
<li><div class="question-with-marks">Explain *anomalies* in http://example.com/db. <span class="marks">(5 marks)</span></div></li>
</ol>
<table>
<thead><tr><th>Field</th><th>Type</th></tr></thead>
<tbody><tr><td>_id</td><td><code>ObjectId</code></td></tr></tbody>
</table>
<pre><code>SELECT * FROM t WHERE a = "b";
</code></pre>
</body>
</html>
"#;

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn plain_prose_renders_pdf() {
        let mut out = Vec::new();
        let status = TypstEngine::shared().render(PLAIN, &mut out);
        assert!(status.is_ok(), "status: {status:?}");
        assert!(out.starts_with(b"%PDF"));
        assert_eq!(status.bytes_written, out.len() as u64);
    }

    #[test]
    fn styled_exam_document_renders() {
        let mut out = Vec::new();
        let status = TypstEngine::shared().render(STYLED, &mut out);
        assert!(status.is_ok(), "status: {status:?}");
        assert!(out.starts_with(b"%PDF"));
    }

    #[test]
    fn percentage_font_size_and_line_height_render() {
        let html = PLAIN.replace(
            "<style>\n</style>",
            "<style>\nbody { font-size: 120%; line-height: 150%; }\n</style>",
        );
        assert!(html.contains("font-size: 120%"));
        let mut out = Vec::new();
        let status = TypstEngine::shared().render(&html, &mut out);
        assert!(status.is_ok(), "status: {status:?}");
        assert!(out.starts_with(b"%PDF"));
    }

    #[test]
    fn rendering_is_reproducible() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        TypstEngine::shared().render(PLAIN, &mut a);
        TypstEngine::shared().render(PLAIN, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn sink_failure_is_reported_not_raised() {
        let status = TypstEngine::shared().render(PLAIN, &mut BrokenSink);
        assert!(matches!(status.error, Some(EngineError::Sink { .. })), "status: {status:?}");
        assert_eq!(status.bytes_written, 0);
        assert!(status.log.iter().any(|l| l.contains("sink closed")));
    }

    #[test]
    fn invalid_typst_is_a_compile_error() {
        let mut log = Vec::new();
        let result = TypstEngine::shared().compile("#let x = (".to_string(), &mut log);
        assert!(matches!(result, Err(EngineError::Compile { .. })));
    }

    #[test]
    fn render_to_path_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let status = render_to_path(TypstEngine::shared(), PLAIN, &path).unwrap();
        assert!(status.is_ok());
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len() as u64, status.bytes_written);
    }

    #[test]
    fn render_to_path_reports_unopenable_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pdf");
        let err = render_to_path(TypstEngine::shared(), PLAIN, &path).unwrap_err();
        assert!(matches!(err, Exam2PdfError::OutputOpenFailed { .. }));
    }

    #[test]
    fn status_serialises() {
        let status = RenderStatus {
            error: Some(EngineError::Compile {
                detail: "x".into(),
            }),
            log: vec!["error: layout failed: x".into()],
            bytes_written: 0,
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: RenderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
        assert!(!back.is_ok());
    }
}
