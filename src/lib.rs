//! # reportflow
//!
//! A flow layout engine for paginated survey reports.
//!
//! A report is a list of typed blocks (headings, paragraphs, results
//! tables, gathered free-text remarks). The engine keeps one continuous
//! vertical flow offset, places every block at that offset, and slices it
//! into fixed-size pages where it crosses a boundary. Lines that do not
//! fit move to the next page; the space left under the last line of a page
//! is spread over that page's lines so the flow stays exact.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]     Report: blocks, responses, labels
//!       ↓
//!   [style]     Palette and role styles resolved into a Theme
//!       ↓
//!   [report]    Statistics, then block by block:
//!       ↓
//!   [text]      Wrap and size (against [font] metrics)
//!       ↓
//!   [layout]    Flow to pages, split text and backgrounds
//!       ↓
//!   [backend]   Absolute draw commands per page
//! ```

pub mod backend;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod report;
pub mod style;
pub mod text;

use backend::{RecordedPage, RecordingBackend};
use error::ReportError;
use font::FontContext;
use model::Report;
use report::ReportGenerator;
use style::ReportStyle;

/// Lay a report out and return the recorded pages.
///
/// Uses the report's own style, or the default one.
pub fn render(report: &Report) -> Result<Vec<RecordedPage>, ReportError> {
    match &report.style {
        Some(style) => render_with_style(report, style),
        None => render_with_style(report, &ReportStyle::default()),
    }
}

/// Lay a report out with an explicit style, ignoring the report's own.
pub fn render_with_style(
    report: &Report,
    style: &ReportStyle,
) -> Result<Vec<RecordedPage>, ReportError> {
    let mut fonts = FontContext::new();
    for entry in &report.fonts {
        fonts.register_entry(entry)?;
    }

    let generator = ReportGenerator::new(style, &fonts)?;
    let geometry = generator.geometry();
    let mut backend = RecordingBackend::new(geometry.page_width, geometry.page_height);
    generator.generate(report, &mut backend)?;
    Ok(backend.into_pages())
}

/// Lay out a report given as JSON and return its pages as JSON.
pub fn render_json(json: &str) -> Result<String, ReportError> {
    let report: Report = serde_json::from_str(json)?;
    let pages = render(&report)?;
    Ok(serde_json::to_string_pretty(&pages)?)
}
