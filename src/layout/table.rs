//! # Table Columns
//!
//! Width resolution for the results table. Each column gets its natural
//! width, then whatever content width is left over is shared out evenly, so
//! the table always spans the full content width.

/// Final column widths for the given natural widths.
pub fn resolve_column_widths(natural: &[f64], content_width: f64) -> Vec<f64> {
    if natural.is_empty() {
        return Vec::new();
    }
    let used: f64 = natural.iter().sum();
    let share = (content_width - used) / natural.len() as f64;
    natural.iter().map(|w| w + share).collect()
}

/// Left edge of each column, starting at `x`.
pub fn column_offsets(widths: &[f64], x: f64) -> Vec<f64> {
    widths
        .iter()
        .scan(x, |left, w| {
            let this = *left;
            *left += w;
            Some(this)
        })
        .collect()
}
