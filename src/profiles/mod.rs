//! Built-in document profiles.
//!
//! A profile bundles everything about a document except its text: the
//! stylesheet, the header block, the enabled Markdown extensions, the
//! line-prefix rules and the default output file name.
//!
//! | Profile | Output | Extensions | Header | Prefix rules |
//! |---------|--------|------------|--------|--------------|
//! | `exam-paper` | `exam_paper_formatted.pdf` | all | title, course, 2 info lines | — |
//! | `consolidated-paper` | `consolidated_paper.pdf` | tables | — | — |
//! | `syllabus-topics` | `important_topics.pdf` | tables, fenced-code | — | 📘 / 🔹 / ✅ |
//! | `field-table` | `final_clean_table.pdf` | tables | — | — |

use crate::config::{DocumentConfig, DocumentConfigBuilder, Extensions, HeaderFields, PrefixRule};
use crate::error::Exam2PdfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const EXAM_PAPER_CSS: &str = include_str!("exam_paper.css");
const CONSOLIDATED_PAPER_CSS: &str = include_str!("consolidated_paper.css");
const SYLLABUS_TOPICS_CSS: &str = include_str!("syllabus_topics.css");
const FIELD_TABLE_CSS: &str = include_str!("field_table.css");

/// One of the built-in document profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Formatted exam paper with a centred header block and mark allocations.
    #[default]
    ExamPaper,
    /// Consolidated sample paper built from several past papers.
    ConsolidatedPaper,
    /// Study notes whose sections are marked with emoji prefixes.
    SyllabusTopics,
    /// A single bordered, centred field/type/description table.
    FieldTable,
}

impl Profile {
    pub const ALL: [Profile; 4] = [
        Profile::ExamPaper,
        Profile::ConsolidatedPaper,
        Profile::SyllabusTopics,
        Profile::FieldTable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Profile::ExamPaper => "exam-paper",
            Profile::ConsolidatedPaper => "consolidated-paper",
            Profile::SyllabusTopics => "syllabus-topics",
            Profile::FieldTable => "field-table",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Profile::ExamPaper => "exam paper with header block, section rules and floated marks",
            Profile::ConsolidatedPaper => "consolidated question paper, tables only",
            Profile::SyllabusTopics => "important-topics notes; 📘/🔹/✅ lines become headings",
            Profile::FieldTable => "single bordered table, Times New Roman, centred cells",
        }
    }

    /// Look a profile up by its kebab-case name.
    pub fn from_name(name: &str) -> Result<Self, Exam2PdfError> {
        let wanted = name.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| Exam2PdfError::UnknownProfile {
                name: name.to_string(),
            })
    }

    pub fn stylesheet(&self) -> &'static str {
        match self {
            Profile::ExamPaper => EXAM_PAPER_CSS,
            Profile::ConsolidatedPaper => CONSOLIDATED_PAPER_CSS,
            Profile::SyllabusTopics => SYLLABUS_TOPICS_CSS,
            Profile::FieldTable => FIELD_TABLE_CSS,
        }
    }

    pub fn header(&self) -> HeaderFields {
        match self {
            Profile::ExamPaper => HeaderFields {
                title: Some("FOURTH SEMESTER (CBCSS–UG) DEGREE EXAMINATION APRIL 2024".into()),
                course: Some("BCA4B05 / BCS4B05 — DATABASE MANAGEMENT SYSTEM AND RDBMS".into()),
                info_lines: vec![
                    "Time: Two and Half Hours".into(),
                    "Maximum: 80 Marks".into(),
                ],
            },
            _ => HeaderFields::default(),
        }
    }

    pub fn page_title(&self) -> &'static str {
        match self {
            Profile::ExamPaper => "Exam Paper",
            Profile::ConsolidatedPaper => "Consolidated Question Paper",
            Profile::SyllabusTopics => "Important Topics for Exam",
            Profile::FieldTable => "Field Table",
        }
    }

    pub fn extensions(&self) -> Extensions {
        match self {
            Profile::ExamPaper => Extensions::all(),
            Profile::SyllabusTopics => Extensions {
                tables: true,
                fenced_code: true,
                line_breaks: false,
            },
            Profile::ConsolidatedPaper | Profile::FieldTable => Extensions {
                tables: true,
                fenced_code: false,
                line_breaks: false,
            },
        }
    }

    pub fn prefix_rules(&self) -> Vec<PrefixRule> {
        match self {
            Profile::SyllabusTopics => vec![
                PrefixRule::new("📘 MOST IMPORTANT TOPICS", 1),
                PrefixRule::new("🔹 Module", 2).stripping("🔹 "),
                PrefixRule::new("✅ BONUS QUICK-SCORE TOPICS", 2).stripping("✅ "),
            ],
            _ => Vec::new(),
        }
    }

    /// File name used when no output path is given.
    pub fn default_output(&self) -> &'static str {
        match self {
            Profile::ExamPaper => "exam_paper_formatted.pdf",
            Profile::ConsolidatedPaper => "consolidated_paper.pdf",
            Profile::SyllabusTopics => "important_topics.pdf",
            Profile::FieldTable => "final_clean_table.pdf",
        }
    }

    /// A builder pre-filled with this profile and `source`.
    pub fn config_builder(&self, source: impl Into<String>) -> DocumentConfigBuilder {
        DocumentConfig::builder()
            .source(source)
            .stylesheet(self.stylesheet())
            .header(self.header())
            .page_title(self.page_title())
            .extensions(self.extensions())
            .prefix_rules(self.prefix_rules())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = Exam2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::render_html;
    use crate::pipeline::pdf::css::Stylesheet;

    #[test]
    fn names_round_trip() {
        for profile in Profile::ALL {
            assert_eq!(Profile::from_name(profile.name()).unwrap(), profile);
            assert_eq!(profile.to_string().parse::<Profile>().unwrap(), profile);
        }
        assert_eq!(Profile::from_name("Exam_Paper").unwrap(), Profile::ExamPaper);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = Profile::from_name("newsletter").unwrap_err();
        assert!(matches!(err, Exam2PdfError::UnknownProfile { ref name } if name == "newsletter"));
    }

    #[test]
    fn default_outputs_are_distinct_pdfs() {
        let mut outputs: Vec<_> = Profile::ALL.iter().map(|p| p.default_output()).collect();
        outputs.sort();
        outputs.dedup();
        assert_eq!(outputs.len(), 4);
        assert!(outputs.iter().all(|o| o.ends_with(".pdf")));
    }

    #[test]
    fn exam_paper_header_has_two_info_lines() {
        let header = Profile::ExamPaper.header();
        assert!(header.title.is_some());
        assert!(header.course.is_some());
        assert_eq!(header.info_lines.len(), 2);
        assert!(Profile::FieldTable.header().is_empty());
    }

    #[test]
    fn extension_sets_match_profiles() {
        assert_eq!(Profile::ExamPaper.extensions(), Extensions::all());
        assert_eq!(Profile::SyllabusTopics.extensions().names(), vec!["tables", "fenced-code"]);
        assert_eq!(Profile::FieldTable.extensions().names(), vec!["tables"]);
    }

    #[test]
    fn syllabus_profile_turns_markers_into_headings() {
        let config = Profile::SyllabusTopics
            .config_builder("📘 MOST IMPORTANT TOPICS – RDBMS\n\n🔹 Module 1: Introduction\n\nNormalization\n")
            .build()
            .unwrap();
        let html = render_html(&config);
        assert!(html.contains("<h1>📘 MOST IMPORTANT TOPICS – RDBMS</h1>"), "got: {html}");
        assert!(html.contains("<h2>Module 1: Introduction</h2>"), "got: {html}");
        assert!(html.contains("<title>Important Topics for Exam</title>"));
    }

    #[test]
    fn stylesheets_parse_into_page_and_body_rules() {
        let exam = Stylesheet::parse(Profile::ExamPaper.stylesheet());
        assert_eq!(exam.get("@page").and_then(|p| p.paper), Some("a4"));
        let syllabus = Stylesheet::parse(Profile::SyllabusTopics.stylesheet());
        assert_eq!(syllabus.get("@page").and_then(|p| p.paper), Some("us-letter"));
        let table = Stylesheet::parse(Profile::FieldTable.stylesheet());
        assert!(table.get("table").map(|t| t.full_width).unwrap_or(false));
        assert!(table.get("body").and_then(|b| b.margin.clone()).is_some());
    }
}
