//! # Report Model
//!
//! The input representation for the layout engine. A report is a flat,
//! ordered list of typed content blocks plus the raw per-respondent
//! responses the statistics tables are computed from.
//!
//! Blocks are read-only to the engine. Their order is the drawing order.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::style::ReportStyle;

/// A complete report ready for layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report title, drawn under the timestamp rule.
    #[serde(default)]
    pub title: String,

    /// When the report was generated. The engine never reads the clock, so
    /// a missing timestamp simply omits the timestamp line.
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,

    /// Content blocks, in drawing order.
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,

    /// Raw answers, one entry per respondent.
    #[serde(default)]
    pub responses: Vec<Response>,

    /// Caller-supplied wording for the synthetic labels.
    #[serde(default)]
    pub labels: Labels,

    /// Style override. Falls back to [`ReportStyle::default`].
    #[serde(default)]
    pub style: Option<ReportStyle>,

    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// One logical content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// A heading. `level` selects the heading style.
    Title { level: u8, text: String },
    /// Free text in the paragraph style.
    Paragraph { text: String },
    /// A question whose answers are counted into a results table.
    Notes {
        identifier: String,
        text: String,
        #[serde(rename = "possibleValues", default)]
        possible_values: Vec<String>,
    },
    /// A free-text question; every respondent's answer is gathered into
    /// one boxed paragraph.
    Remark { identifier: String, text: String },
}

impl ContentBlock {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentBlock::Title { .. } => "Title",
            ContentBlock::Paragraph { .. } => "Paragraph",
            ContentBlock::Notes { .. } => "Notes",
            ContentBlock::Remark { .. } => "Remark",
        }
    }
}

/// One respondent's answers, keyed by block identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub answers: BTreeMap<String, Answer>,
}

impl Response {
    pub fn answer(&self, identifier: &str) -> Option<&Answer> {
        self.answers.get(identifier)
    }
}

/// A single answer value as it arrives from the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Number(serde_json::Number),
    Choices(Vec<String>),
}

impl Answer {
    /// The answer's values as strings. Multi-choice answers yield one value
    /// per choice.
    pub fn values(&self) -> Vec<String> {
        match self {
            Answer::Text(s) => vec![s.clone()],
            Answer::Number(n) => vec![n.to_string()],
            Answer::Choices(v) => v.clone(),
        }
    }

    /// Free-text content, if this answer is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Wording for the labels the engine itself generates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    /// Prefix of the timestamp line.
    pub generated_at: String,
    /// `chrono` format string for the timestamp.
    pub timestamp_format: String,
    /// Header of the synthetic "total responses" column.
    pub total_responses: String,
    /// Header of the synthetic "participant count" column.
    pub participant_count: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            generated_at: "Document généré le".to_string(),
            timestamp_format: "%d/%m/%Y à %H:%M".to_string(),
            total_responses: "Total des réponses".to_string(),
            participant_count: "Nombre de participants".to_string(),
        }
    }
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: Edges::symmetric(40.0, 50.0),
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_deserialize_by_type_tag() {
        let json = r#"[
            { "type": "Title", "level": 1, "text": "Bilan" },
            { "type": "Paragraph", "text": "Intro" },
            { "type": "Notes", "identifier": "q1", "text": "Note", "possibleValues": ["1", "2"] },
            { "type": "Remark", "identifier": "q2", "text": "Commentaires" }
        ]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[2],
            ContentBlock::Notes {
                identifier: "q1".to_string(),
                text: "Note".to_string(),
                possible_values: vec!["1".to_string(), "2".to_string()],
            }
        );
        assert_eq!(blocks[3].kind_name(), "Remark");
    }

    #[test]
    fn answers_accept_text_numbers_and_lists() {
        let json = r#"{ "answers": { "a": "oui", "b": 4, "c": ["x", "y"] } }"#;
        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(response.answer("a").unwrap().values(), vec!["oui"]);
        assert_eq!(response.answer("b").unwrap().values(), vec!["4"]);
        assert_eq!(response.answer("c").unwrap().values(), vec!["x", "y"]);
        assert!(response.answer("b").unwrap().as_text().is_none());
    }

    #[test]
    fn report_defaults_are_empty() {
        let report: Report = serde_json::from_str("{}").unwrap();
        assert!(report.blocks.is_empty());
        assert!(report.generated_at.is_none());
        assert_eq!(report.labels, Labels::default());
    }

    #[test]
    fn partial_page_config_keeps_default_margins() {
        let config: PageConfig = serde_json::from_str(r#"{ "size": "A5" }"#).unwrap();
        assert_eq!(config.size, PageSize::A5);
        assert_eq!(config.margin, Edges::symmetric(40.0, 50.0));
    }

    #[test]
    fn a4_content_area() {
        let config = PageConfig::default();
        let (w, h) = config.size.dimensions();
        assert!((w - config.margin.horizontal() - 495.28).abs() < 1e-9);
        assert!((h - config.margin.vertical() - 761.89).abs() < 1e-9);
    }
}
