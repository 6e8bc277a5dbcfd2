//! Structured error types for the report layout engine.
//!
//! Configuration errors (styles, colors, fonts) are fatal and surface before
//! anything is drawn. Layout errors cover preconditions the splitter cannot
//! work around.

use thiserror::Error;

/// The unified error type returned by all public reportflow functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a valid report or style.
    #[error("Failed to parse report: {source}{hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A title block references a heading level with no style.
    #[error("No heading style is defined for title level {0}")]
    UnknownTitleLevel(u8),

    /// A style references a color name missing from the palette.
    #[error("Style '{style}' references undefined color '{color}'")]
    UnknownColor { style: String, color: String },

    /// A style references a font that was never registered.
    #[error("Style '{style}' references unregistered font {family} (weight {weight}, italic {italic})")]
    UnknownFont {
        style: String,
        family: String,
        weight: u32,
        italic: bool,
    },

    /// The labels carry a strftime pattern chrono cannot format.
    #[error("Invalid timestamp format '{0}'")]
    TimestampFormat(String),

    /// A custom font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// Wrapping was requested against a width that leaves no room for text.
    #[error("Cannot wrap text into width {width} with padding {padding}: no room left")]
    NonPositiveWidth { width: f64, padding: f64 },

    /// A single line does not fit on an empty page.
    #[error("Line height {line_height} exceeds the page content height {content_height}")]
    LineTallerThanPage {
        line_height: f64,
        content_height: f64,
    },

    /// The text splitter stopped making progress. Indicates a bug.
    #[error("Page splitter stalled at flow offset {offset} with {remaining} lines left")]
    SplitStalled { offset: f64, remaining: usize },

    /// A draw command targeted a page the backend never created.
    #[error("Page {0} does not exist in the backend")]
    MissingPage(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check block types and field names."
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        let hint = if hint.is_empty() {
            String::new()
        } else {
            format!("\n  Hint: {hint}")
        };
        ReportError::Parse { source: e, hint }
    }
}
