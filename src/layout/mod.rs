//! # Flow Layout
//!
//! The document is one continuous vertical flow. Blocks are measured,
//! placed at the current flow offset, and only then sliced into pages:
//!
//! 1. Measure the block (wrap lines, size the box)
//! 2. If the block fits on the page holding its top, place it as is
//! 3. Otherwise fill each page with as many whole lines as fit, stretch
//!    them over the leftover space, and continue on the next page
//! 4. Clip the block's background at every page boundary
//! 5. Advance the flow by the height actually consumed
//!
//! Pages are never pre-allocated. A page exists once something is drawn
//! on it.

pub mod flow;
pub mod page_break;
pub mod table;

pub use flow::PageGeometry;
pub use page_break::{consumed_height, split_rectangle, split_text, PlacedLine, RectangleFragment};

use crate::backend::{PageBackend, Paint};
use crate::error::ReportError;
use crate::font::MetricsProvider;
use crate::style::{Background, Color};
use crate::text::{TextBlock, TextMeasurer};

impl From<Background> for Paint {
    fn from(bg: Background) -> Self {
        Paint {
            fill: bg.fill,
            opacity: Some(bg.opacity),
            border: bg.border,
            border_width: bg.border.map(|_| bg.border_width),
        }
    }
}

/// Draw a text block with its top-left corner at flow `(x, y)`.
///
/// The background goes down first, sized to the block frame and to the
/// flow height the block ends up consuming, then the lines. Returns that
/// consumed height.
pub fn draw_text_block<M, B>(
    geometry: &PageGeometry,
    measurer: &TextMeasurer<'_, M>,
    backend: &mut B,
    block: TextBlock,
    x: f64,
    y: f64,
) -> Result<f64, ReportError>
where
    M: MetricsProvider + ?Sized,
    B: PageBackend + ?Sized,
{
    draw_row(geometry, measurer, backend, vec![(block, x)], y)
}

/// Draw blocks side by side, their top edges on flow offset `y`.
///
/// Every block is split before anything is drawn. The row consumes the
/// largest height any of its blocks consumes, and every background is
/// stretched to that height so the boxes of a row end on one line even
/// when the row crosses a page boundary.
pub fn draw_row<M, B>(
    geometry: &PageGeometry,
    measurer: &TextMeasurer<'_, M>,
    backend: &mut B,
    cells: Vec<(TextBlock, f64)>,
    y: f64,
) -> Result<f64, ReportError>
where
    M: MetricsProvider + ?Sized,
    B: PageBackend + ?Sized,
{
    let mut split = Vec::with_capacity(cells.len());
    let mut consumed: f64 = 0.0;
    for (block, x) in cells {
        let block = measurer.resolve(block)?;
        let lines = split_text(geometry, &block, x, y)?;
        consumed = consumed.max(consumed_height(&block, &lines));
        split.push((block, x, lines));
    }

    for (block, x, lines) in &split {
        if let Some(background) = block.background {
            fill_rectangle(
                geometry,
                backend,
                *x,
                y,
                block.frame_width,
                consumed,
                background.into(),
            )?;
        }
        draw_lines(backend, lines)?;
    }

    Ok(consumed)
}

/// Draw placed lines, creating their pages as needed.
pub fn draw_lines<B: PageBackend + ?Sized>(
    backend: &mut B,
    lines: &[PlacedLine],
) -> Result<(), ReportError> {
    for line in lines {
        backend.ensure_page(line.page_index);
        if line.line.text.is_empty() {
            continue;
        }
        backend.draw_text(
            line.page_index,
            &line.line.text,
            line.x,
            line.y,
            line.size,
            &line.font,
            line.color,
        )?;
    }
    Ok(())
}

/// Paint a rectangle spanning flow `[y, y + height)`, one fragment per page.
pub fn fill_rectangle<B: PageBackend + ?Sized>(
    geometry: &PageGeometry,
    backend: &mut B,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    paint: Paint,
) -> Result<(), ReportError> {
    for fragment in split_rectangle(geometry, x, y, width, height) {
        if fragment.height <= 0.0 {
            continue;
        }
        backend.ensure_page(fragment.page_index);
        backend.draw_rectangle(
            fragment.page_index,
            geometry.to_backend_x(fragment.x),
            geometry.to_backend_y(fragment.y + fragment.height),
            fragment.width,
            fragment.height,
            paint,
        )?;
    }
    Ok(())
}

/// Draw a horizontal rule across the content width at flow offset `y`.
pub fn draw_rule<B: PageBackend + ?Sized>(
    geometry: &PageGeometry,
    backend: &mut B,
    y: f64,
    thickness: f64,
    color: Color,
) -> Result<(), ReportError> {
    let page = geometry.page_index_of(y);
    backend.ensure_page(page);
    let by = geometry.to_backend_y(geometry.in_page_offset(y));
    backend.draw_line(
        page,
        (geometry.to_backend_x(0.0), by),
        (geometry.to_backend_x(geometry.content_width), by),
        thickness,
        color,
    )
}
