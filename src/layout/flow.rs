//! # Flow Coordinates
//!
//! The layout works in one continuous vertical coordinate, the *flow*,
//! starting at 0 at the top of the first page's content area and growing
//! downwards forever. Pages are slices of `content_height` each. This module
//! maps flow offsets to pages and to the backend's bottom-up page space.

use crate::model::PageConfig;

/// Fixed page geometry for one document style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub content_width: f64,
    pub content_height: f64,
}

impl PageGeometry {
    pub fn new(config: &PageConfig) -> Self {
        let (page_width, page_height) = config.size.dimensions();
        Self {
            page_width,
            page_height,
            margin_left: config.margin.left,
            margin_top: config.margin.top,
            content_width: page_width - config.margin.horizontal(),
            content_height: page_height - config.margin.vertical(),
        }
    }

    /// Page holding flow offset `y`.
    pub fn page_index_of(&self, y: f64) -> usize {
        (y / self.content_height).floor().max(0.0) as usize
    }

    /// Offset of `y` from the top of its page's content area.
    pub fn in_page_offset(&self, y: f64) -> f64 {
        y - self.page_index_of(y) as f64 * self.content_height
    }

    /// Page holding the last point of the span `[y, y + height)`. A span
    /// that ends exactly on a page boundary belongs to the page above it.
    pub fn last_page_of(&self, y: f64, height: f64) -> usize {
        let first = self.page_index_of(y);
        if height <= 0.0 {
            return first;
        }
        let end = ((y + height) / self.content_height).ceil() as usize;
        end.saturating_sub(1).max(first)
    }

    /// Whether the span `[y, y + height)` lies on a single page.
    pub fn fits_one_page(&self, y: f64, height: f64) -> bool {
        self.page_index_of(y) == self.last_page_of(y, height)
    }

    /// Backend y of in-page offset 0. The backend measures y upwards from
    /// the bottom edge of the page.
    pub fn page_top_y(&self) -> f64 {
        self.page_height - self.margin_top
    }

    /// Backend y of an in-page offset.
    pub fn to_backend_y(&self, offset: f64) -> f64 {
        self.page_top_y() - offset
    }

    /// Backend x of a content-area x.
    pub fn to_backend_x(&self, x: f64) -> f64 {
        self.margin_left + x
    }
}
