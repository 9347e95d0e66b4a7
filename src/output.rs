//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Wall-clock time spent in each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimings {
    pub normalize_ms: u64,
    pub markup_ms: u64,
    pub assemble_ms: u64,
    pub pdf_ms: u64,
    pub total_ms: u64,
}

/// Summary of one document rendered to a file.
///
/// Returned by [`crate::convert::convert_to_file`] and printed by the CLI
/// with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    /// Path as given by the caller.
    pub output_path: PathBuf,
    /// Absolute form of `output_path`, used in the success message.
    pub absolute_path: PathBuf,
    /// PDF bytes written; zero when the engine failed.
    pub bytes_written: u64,
    /// Size of the assembled HTML document.
    pub html_bytes: usize,
    pub timings: StageTimings,
    /// Engine warnings, in the order reported.
    pub warnings: Vec<String>,
    /// Engine failure, if any. The file may be empty when this is set.
    pub engine_error: Option<crate::error::EngineError>,
}

impl RenderReport {
    /// `true` when the engine produced the PDF without error.
    pub fn is_ok(&self) -> bool {
        self.engine_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn report_serialises_to_json() {
        let report = RenderReport {
            output_path: PathBuf::from("out.pdf"),
            absolute_path: PathBuf::from("/tmp/out.pdf"),
            bytes_written: 1234,
            html_bytes: 456,
            timings: StageTimings {
                pdf_ms: 80,
                total_ms: 90,
                ..Default::default()
            },
            warnings: vec![],
            engine_error: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bytes_written"], 1234);
        assert_eq!(json["timings"]["pdf_ms"], 80);
        assert!(json["engine_error"].is_null());
        assert!(report.is_ok());
    }

    #[test]
    fn failed_report_is_not_ok() {
        let report = RenderReport {
            output_path: PathBuf::from("out.pdf"),
            absolute_path: PathBuf::from("/tmp/out.pdf"),
            bytes_written: 0,
            html_bytes: 10,
            timings: StageTimings::default(),
            warnings: vec![],
            engine_error: Some(EngineError::Export {
                detail: "no pages".into(),
            }),
        };
        assert!(!report.is_ok());
    }
}
