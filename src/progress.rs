//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::DocumentConfigBuilder::progress_callback`] to be told
//! when each pipeline stage starts and finishes. The CLI uses it to drive a
//! spinner; library callers can forward the events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use exam2pdf::{DocumentConfig, RenderProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl RenderProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = DocumentConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { finished: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the rendering pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Normalize,
    Markup,
    Assemble,
    Pdf,
}

impl Stage {
    /// All stages in the order the pipeline runs them.
    pub const ALL: [Stage; 4] = [Stage::Normalize, Stage::Markup, Stage::Assemble, Stage::Pdf];

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalising markers",
            Stage::Markup => "rendering markup",
            Stage::Assemble => "assembling document",
            Stage::Pdf => "laying out PDF",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. The pipeline is single-threaded, but the
/// trait is `Send + Sync` so a config holding a callback can still be moved
/// across threads.
pub trait RenderProgressCallback: Send + Sync {
    /// Called just before a stage runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called after a stage finishes.
    ///
    /// # Arguments
    /// * `stage`      — the stage that finished
    /// * `elapsed_ms` — wall-clock time spent in the stage
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called once when the PDF engine reports a failure.
    fn on_engine_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DocumentConfig`].
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl RenderProgressCallback for RecordingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(format!("done {stage:?}"));
        }

        fn on_engine_error(&self, error: &str) {
            self.events.lock().unwrap().push(format!("error {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Markup);
        cb.on_stage_complete(Stage::Markup, 3);
        cb.on_engine_error("boom");
    }

    #[test]
    fn recording_callback_receives_events() {
        let cb = RecordingCallback::default();
        cb.on_stage_start(Stage::Pdf);
        cb.on_engine_error("layout failed");
        cb.on_stage_complete(Stage::Pdf, 12);

        let events = cb.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start Pdf", "error layout failed", "done Pdf"]
        );
    }

    #[test]
    fn stages_are_ordered() {
        assert_eq!(Stage::ALL[0], Stage::Normalize);
        assert_eq!(Stage::ALL[3], Stage::Pdf);
        assert_eq!(Stage::Assemble.to_string(), "assembling document");
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::Normalize);
    }
}
