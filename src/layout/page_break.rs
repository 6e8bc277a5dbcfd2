//! # Page Breaks
//!
//! Slicing measured content across page boundaries.
//!
//! A text block that fits its page is placed line by line. A block that
//! crosses a boundary is distributed page by page: each page takes as many
//! whole lines as fit, and the sliver left under the last of them is spread
//! evenly over the lines on that page (their `advance`). Summing the block
//! height and every advance therefore gives exactly the flow height the
//! block consumed, page traversals included.
//!
//! Rectangles are clipped at each boundary instead; their fragments always
//! add up to the requested height.

use serde::Serialize;

use crate::error::ReportError;
use crate::font::FontKey;
use crate::style::{Background, Color};
use crate::text::{Line, MeasuredBlock};

use super::flow::PageGeometry;

/// Slack for floating point comparisons against page boundaries.
const EPSILON: f64 = 1e-6;

/// A line assigned to a page, with its draw position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub line: Line,
    pub page_index: usize,
    /// Backend x of the line start.
    pub x: f64,
    /// Backend y of the baseline.
    pub y: f64,
    /// In-page offset of the top of the line box.
    pub top: f64,
    pub size: f64,
    pub font: FontKey,
    pub color: Color,
    pub background: Option<Background>,
    /// Extra vertical space consumed after this line. Non-zero only on pages
    /// the block is stretched to fill.
    pub advance: f64,
}

/// The part of a rectangle that falls on one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleFragment {
    pub page_index: usize,
    /// Content-area x.
    pub x: f64,
    /// In-page offset of the fragment's top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Flow height a split block consumes: its height plus every advance.
pub fn consumed_height(block: &MeasuredBlock, lines: &[PlacedLine]) -> f64 {
    block.height + lines.iter().map(|l| l.advance).sum::<f64>()
}

/// Assign every line of `block`, whose top-left corner sits at flow
/// position `(x, y)`, to a page.
///
/// Lines come back in their original order with non-decreasing page
/// indices.
pub fn split_text(
    geometry: &PageGeometry,
    block: &MeasuredBlock,
    x: f64,
    y: f64,
) -> Result<Vec<PlacedLine>, ReportError> {
    let lead = if block.centered {
        block.height / 2.0 - block.text_height / 2.0
    } else {
        block.padding
    };
    let origin = y + lead;

    if geometry.fits_one_page(y, block.height) {
        let page_index = geometry.page_index_of(y);
        let offset = origin - page_index as f64 * geometry.content_height;
        return Ok(block
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let top = offset + i as f64 * block.line_height;
                place(geometry, block, line, x, page_index, top, 0.0)
            })
            .collect());
    }

    split_across_pages(geometry, block, x, origin)
}

fn split_across_pages(
    geometry: &PageGeometry,
    block: &MeasuredBlock,
    x: f64,
    origin: f64,
) -> Result<Vec<PlacedLine>, ReportError> {
    let line_height = block.line_height;
    if line_height > geometry.content_height + EPSILON {
        return Err(ReportError::LineTallerThanPage {
            line_height,
            content_height: geometry.content_height,
        });
    }

    let total = block.line_count();
    let mut placed = Vec::with_capacity(total);
    // Pages are walked explicitly; recomputing them from a flow offset
    // sitting exactly on a boundary is at the mercy of rounding.
    let mut page_index = geometry.page_index_of(origin);
    let mut offset = geometry.in_page_offset(origin);
    // Sliver skipped because not even one line fit; charged to the next line placed.
    let mut carry = 0.0;
    let mut empty_pages = 0;

    while placed.len() < total {
        let current = geometry.content_height - offset;
        let remaining = total - placed.len();
        let fit = (((current + EPSILON) / line_height).floor() as usize).min(remaining);

        if fit == 0 {
            empty_pages += 1;
            if empty_pages > 1 {
                return Err(ReportError::SplitStalled {
                    offset: page_index as f64 * geometry.content_height + offset,
                    remaining,
                });
            }
            carry += current;
            page_index += 1;
            offset = 0.0;
            continue;
        }
        empty_pages = 0;

        let last_page = fit == remaining;
        let stretch = if last_page {
            0.0
        } else {
            (current - fit as f64 * line_height).max(0.0) / fit as f64
        };

        log::debug!(page_index, lines = fit, stretch; "Placing text lines on page");

        let mut top = offset;
        for line in &block.lines[placed.len()..placed.len() + fit] {
            let advance = stretch + carry;
            carry = 0.0;
            placed.push(place(geometry, block, line, x, page_index, top, advance));
            top += line_height + stretch;
        }

        page_index += 1;
        offset = 0.0;
    }

    Ok(placed)
}

fn place(
    geometry: &PageGeometry,
    block: &MeasuredBlock,
    line: &Line,
    x: f64,
    page_index: usize,
    top: f64,
    advance: f64,
) -> PlacedLine {
    let line_x = if block.centered {
        x + (block.frame_width - line.width) / 2.0
    } else {
        x + block.padding
    };
    let baseline = top + block.line_height + block.descender;
    PlacedLine {
        line: line.clone(),
        page_index,
        x: geometry.to_backend_x(line_x),
        y: geometry.to_backend_y(baseline),
        top,
        size: block.size,
        font: block.font.clone(),
        color: block.color,
        background: block.background,
        advance,
    }
}

/// Clip a rectangle spanning flow `[y, y + height)` at every page boundary.
pub fn split_rectangle(
    geometry: &PageGeometry,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<RectangleFragment> {
    let mut fragments = Vec::new();
    let mut page_index = geometry.page_index_of(y);
    let mut offset = geometry.in_page_offset(y);
    let mut remaining = height.max(0.0);

    loop {
        let current = geometry.content_height - offset;

        if remaining <= current + EPSILON {
            fragments.push(RectangleFragment {
                page_index,
                x,
                y: offset,
                width,
                height: remaining,
            });
            return fragments;
        }

        if current > EPSILON {
            fragments.push(RectangleFragment {
                page_index,
                x,
                y: offset,
                width,
                height: current,
            });
        }
        remaining -= current;
        page_index += 1;
        offset = 0.0;
    }
}
