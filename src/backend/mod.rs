//! # Page Backend
//!
//! The surface the layout draws onto. A backend owns an append-only list of
//! fixed-size pages and accepts draw commands in absolute page coordinates,
//! y measured upwards from the bottom edge.
//!
//! [`RecordingBackend`] keeps the commands in memory, in call order, and
//! serializes them for whatever turns them into a file.

use serde::Serialize;

use crate::error::ReportError;
use crate::font::FontKey;
use crate::style::Color;

/// Fill and stroke of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
}

pub trait PageBackend {
    /// Make sure pages `0..=index` exist, appending blank ones as needed.
    /// Returns the page count.
    fn ensure_page(&mut self, index: usize) -> usize;

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        font: &FontKey,
        color: Color,
    ) -> Result<(), ReportError>;

    /// `(x, y)` is the lower-left corner.
    fn draw_rectangle(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: Paint,
    ) -> Result<(), ReportError>;

    fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Color,
    ) -> Result<(), ReportError>;
}

/// What was drawn, in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawCommand {
    Text {
        text: String,
        x: f64,
        y: f64,
        size: f64,
        font: String,
        color: Color,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(flatten)]
        paint: Paint,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        color: Color,
    },
}

/// A recorded page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPage {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordedPage {
    /// The text of every text command, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// An in-memory backend that records every command.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    width: f64,
    height: f64,
    pages: Vec<RecordedPage>,
}

impl RecordingBackend {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<RecordedPage> {
        self.pages
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut RecordedPage, ReportError> {
        self.pages
            .get_mut(index)
            .ok_or(ReportError::MissingPage(index))
    }
}

impl PageBackend for RecordingBackend {
    fn ensure_page(&mut self, index: usize) -> usize {
        while self.pages.len() <= index {
            let index = self.pages.len();
            log::debug!(index; "Adding page");
            self.pages.push(RecordedPage {
                index,
                width: self.width,
                height: self.height,
                commands: Vec::new(),
            });
        }
        self.pages.len()
    }

    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        y: f64,
        size: f64,
        font: &FontKey,
        color: Color,
    ) -> Result<(), ReportError> {
        let font = match (font.weight >= 600, font.italic) {
            (false, false) => font.family.clone(),
            (true, false) => format!("{}-Bold", font.family),
            (false, true) => format!("{}-Oblique", font.family),
            (true, true) => format!("{}-BoldOblique", font.family),
        };
        self.page_mut(page)?.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            font,
            color,
        });
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: Paint,
    ) -> Result<(), ReportError> {
        self.page_mut(page)?.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            paint,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Color,
    ) -> Result<(), ReportError> {
        self.page_mut(page)?.commands.push(DrawCommand::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            thickness,
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_created_lazily_and_only_appended() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        assert!(backend.pages().is_empty());
        assert_eq!(backend.ensure_page(2), 3);
        assert_eq!(backend.ensure_page(0), 3);
        assert_eq!(
            backend.pages().iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn drawing_on_missing_page_fails() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let err = backend
            .draw_rectangle(0, 0.0, 0.0, 1.0, 1.0, Paint::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingPage(0)));
    }

    #[test]
    fn commands_keep_draw_order() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        backend.ensure_page(0);
        backend
            .draw_line(0, (0.0, 10.0), (100.0, 10.0), 1.0, Color::BLACK)
            .unwrap();
        backend
            .draw_text(0, "Bilan", 5.0, 6.0, 12.0, &FontKey::helvetica(700), Color::BLACK)
            .unwrap();
        let page = &backend.pages()[0];
        assert!(matches!(page.commands[0], DrawCommand::Line { .. }));
        assert_eq!(page.texts(), vec!["Bilan"]);
        match &page.commands[1] {
            DrawCommand::Text { font, .. } => assert_eq!(font, "Helvetica-Bold"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn commands_serialize_with_type_tag() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        backend.ensure_page(0);
        backend
            .draw_rectangle(
                0,
                1.0,
                2.0,
                3.0,
                4.0,
                Paint {
                    fill: Some(Color::WHITE),
                    ..Paint::default()
                },
            )
            .unwrap();
        let json = serde_json::to_value(backend.pages()).unwrap();
        assert_eq!(json[0]["commands"][0]["type"], "rect");
        assert_eq!(json[0]["commands"][0]["fill"]["r"], 1.0);
        assert!(json[0]["commands"][0].get("border").is_none());
    }
}
