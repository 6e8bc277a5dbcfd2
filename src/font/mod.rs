//! # Font Metrics
//!
//! The metrics provider the measurer wraps text against.
//!
//! Helvetica and Helvetica-Bold are always available (with their oblique
//! variants). Custom TrueType/OpenType fonts can be registered from report
//! input; their advance widths and vertical metrics are read with ttf-parser.
//! Nothing here renders glyphs.

pub mod metrics;

use std::collections::HashMap;

use base64::Engine as _;

use crate::error::ReportError;
use crate::model::FontEntry;
pub use metrics::StandardFontMetrics;

/// Measures text for layout. Implementations must be pure: the same
/// arguments always give the same answer.
pub trait MetricsProvider {
    /// Width of `text` set in `font` at `size` points.
    fn width_of(&self, text: &str, font: &FontKey, size: f64) -> f64;

    /// Height of one line of `font` at `size` points.
    fn line_height_at(&self, font: &FontKey, size: f64) -> f64;

    /// Distance from the baseline to the bottom of the line box. Negative.
    fn descender_at(&self, font: &FontKey, size: f64) -> f64;
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    pub fn helvetica(weight: u32) -> Self {
        Self {
            family: "Helvetica".to_string(),
            weight,
            italic: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// A built-in face. No font file needed.
    Standard(StandardFontMetrics),
    /// A TrueType/OpenType font supplied by the caller.
    Custom(CustomFontMetrics),
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        let units = self.ascender as f64 - self.descender as f64 + self.line_gap as f64;
        units / self.units_per_em as f64 * font_size
    }

    pub fn descender(&self, font_size: f64) -> f64 {
        self.descender as f64 / self.units_per_em as f64 * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Latin-1 and Latin Extended-A cover everything a report is written in
        for code in 32u32..=0x17F {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        })
    }
}

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            ((400, false), metrics::HELVETICA),
            ((700, false), metrics::HELVETICA_BOLD),
            ((400, true), metrics::HELVETICA),
            ((700, true), metrics::HELVETICA_BOLD),
        ];

        for ((weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: "Helvetica".to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self { fonts }
    }

    pub fn get(&self, key: &FontKey) -> Option<&FontData> {
        self.fonts.get(key)
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, key: &FontKey) -> &FontData {
        if let Some(font) = self.fonts.get(key) {
            return font;
        }
        match self.fonts.get(&FontKey::helvetica(if key.weight >= 600 { 700 } else { 400 })) {
            Some(font) => font,
            None => &HELVETICA_FALLBACK,
        }
    }

    /// Register a custom font from raw TrueType/OpenType bytes.
    pub fn register(&mut self, key: FontKey, data: &[u8]) -> Result<(), ReportError> {
        let metrics = CustomFontMetrics::from_font_data(data).ok_or_else(|| {
            ReportError::Font(format!("could not parse font data for '{}'", key.family))
        })?;
        log::debug!(family = key.family.as_str(), weight = key.weight; "Registered custom font");
        self.fonts.insert(key, FontData::Custom(metrics));
        Ok(())
    }
}

static HELVETICA_FALLBACK: FontData = FontData::Standard(metrics::HELVETICA);

/// Shared font context used by the measurer and the report generator.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Whether `key` is registered exactly (no fallback).
    pub fn contains(&self, key: &FontKey) -> bool {
        self.registry.get(key).is_some()
    }

    /// Decode and register a font entry from report input.
    pub fn register_entry(&mut self, entry: &FontEntry) -> Result<(), ReportError> {
        let data = decode_font_src(&entry.src)?;
        self.registry.register(
            FontKey {
                family: entry.family.clone(),
                weight: entry.weight,
                italic: entry.italic,
            },
            &data,
        )
    }
}

impl MetricsProvider for FontContext {
    fn width_of(&self, text: &str, font: &FontKey, size: f64) -> f64 {
        match self.registry.resolve(font) {
            FontData::Standard(m) => m.measure_string(text, size),
            FontData::Custom(m) => text.chars().map(|ch| m.char_width(ch, size)).sum(),
        }
    }

    fn line_height_at(&self, font: &FontKey, size: f64) -> f64 {
        match self.registry.resolve(font) {
            FontData::Standard(m) => m.line_height(size),
            FontData::Custom(m) => m.line_height(size),
        }
    }

    fn descender_at(&self, font: &FontKey, size: f64) -> f64 {
        match self.registry.resolve(font) {
            FontData::Standard(m) => m.descender(size),
            FontData::Custom(m) => m.descender(size),
        }
    }
}

/// Accepts plain base64 or a `data:` URI.
fn decode_font_src(src: &str) -> Result<Vec<u8>, ReportError> {
    let payload = match src.find("base64,") {
        Some(idx) if src.starts_with("data:") => &src[idx + "base64,".len()..],
        _ => src,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ReportError::Font(format!("invalid base64 font data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space_width() {
        let ctx = FontContext::new();
        let w = ctx.width_of(" ", &FontKey::helvetica(400), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn bold_wider_than_regular() {
        let ctx = FontContext::new();
        let regular = ctx.width_of("Moyenne", &FontKey::helvetica(400), 12.0);
        let bold = ctx.width_of("Moyenne", &FontKey::helvetica(700), 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn unknown_font_falls_back_for_metrics_but_is_not_contained() {
        let ctx = FontContext::new();
        let key = FontKey {
            family: "Unknown".to_string(),
            weight: 400,
            italic: false,
        };
        assert!(!ctx.contains(&key));
        let w1 = ctx.width_of("A", &key, 12.0);
        let w2 = ctx.width_of("A", &FontKey::helvetica(400), 12.0);
        assert!((w1 - w2).abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_zero_width() {
        let ctx = FontContext::new();
        assert_eq!(ctx.width_of("", &FontKey::helvetica(400), 12.0), 0.0);
    }

    #[test]
    fn invalid_font_data_is_an_error() {
        let mut ctx = FontContext::new();
        let entry = FontEntry {
            family: "Broken".to_string(),
            src: "data:font/ttf;base64,AAAA".to_string(),
            weight: 400,
            italic: false,
        };
        assert!(matches!(ctx.register_entry(&entry), Err(ReportError::Font(_))));

        let entry = FontEntry {
            src: "not base64 at all!".to_string(),
            ..entry
        };
        assert!(matches!(ctx.register_entry(&entry), Err(ReportError::Font(_))));
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        assert_eq!(decode_font_src("data:font/ttf;base64,AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_font_src("AAEC").unwrap(), vec![0, 1, 2]);
    }
}
