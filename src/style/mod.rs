//! # Report Styles
//!
//! Colors, page geometry and per-role text styles, as one immutable value.
//!
//! Styles reference colors by palette name and fonts by family/weight. Both
//! lookups are resolved once, when a [`Theme`] is built, and a miss is a
//! fatal configuration error: a heading that points at an undefined color
//! must not silently render black.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::font::{FontContext, FontKey};
use crate::model::PageConfig;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb` or `#rrggbb`. Anything else is black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Color::BLACK;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A font reference inside a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontRef {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl Default for FontRef {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            weight: 400,
            italic: false,
        }
    }
}

impl FontRef {
    pub fn bold() -> Self {
        Self {
            weight: 700,
            ..Self::default()
        }
    }

    fn key(&self) -> FontKey {
        FontKey {
            family: self.family.clone(),
            weight: self.weight,
            italic: self.italic,
        }
    }
}

/// Decoration drawn behind a text block. Colors are palette names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundStyle {
    pub fill: Option<String>,
    pub border: Option<String>,
    pub border_width: f64,
    pub opacity: f64,
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        Self {
            fill: None,
            border: None,
            border_width: 0.0,
            opacity: 1.0,
        }
    }
}

/// How one kind of text block looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font: FontRef,
    pub size: f64,
    /// Multiplier applied to the font size before asking for a line height.
    pub line_height: f64,
    /// Palette name of the text color.
    pub color: String,
    pub padding: f64,
    pub centered: bool,
    /// Minimum block height.
    pub min_height: f64,
    pub background: Option<BackgroundStyle>,
    /// Vertical space left after the block.
    pub gap_after: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontRef::default(),
            size: 12.0,
            line_height: 1.0,
            color: "text".to_string(),
            padding: 0.0,
            centered: false,
            min_height: 0.0,
            background: None,
            gap_after: 0.0,
        }
    }
}

/// The horizontal rule under the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleStyle {
    pub color: String,
    pub thickness: f64,
    pub gap_after: f64,
}

impl Default for RuleStyle {
    fn default() -> Self {
        Self {
            color: "primary".to_string(),
            thickness: 1.0,
            gap_after: 12.0,
        }
    }
}

/// The complete, caller-configurable look of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportStyle {
    pub page: PageConfig,
    pub palette: BTreeMap<String, Color>,
    pub timestamp: TextStyle,
    pub title: TextStyle,
    pub rule: RuleStyle,
    /// Heading styles keyed by title level.
    pub headings: BTreeMap<u8, TextStyle>,
    pub paragraph: TextStyle,
    pub notes_label: TextStyle,
    pub table_header: TextStyle,
    pub table_body: TextStyle,
    /// Space left under a results table.
    pub table_gap: f64,
    pub remark_label: TextStyle,
    pub remark_body: TextStyle,
}

impl Default for ReportStyle {
    fn default() -> Self {
        let palette = [
            ("text", Color::hex("#333333")),
            ("muted", Color::hex("#7f7f7f")),
            ("primary", Color::hex("#1f4e79")),
            ("secondary", Color::hex("#2e75b6")),
            ("light", Color::hex("#dde8f3")),
            ("border", Color::hex("#9bb7d4")),
            ("white", Color::WHITE),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();

        let heading = |size: f64, color: &str, gap_after: f64| TextStyle {
            font: FontRef::bold(),
            size,
            color: color.to_string(),
            gap_after,
            ..TextStyle::default()
        };
        let boxed = |fill: &str| {
            Some(BackgroundStyle {
                fill: Some(fill.to_string()),
                border: Some("border".to_string()),
                border_width: 0.5,
                opacity: 1.0,
            })
        };

        let mut headings = BTreeMap::new();
        headings.insert(
            1,
            TextStyle {
                padding: 6.0,
                background: Some(BackgroundStyle {
                    fill: Some("primary".to_string()),
                    ..BackgroundStyle::default()
                }),
                ..heading(16.0, "white", 10.0)
            },
        );
        headings.insert(2, heading(14.0, "secondary", 8.0));
        headings.insert(3, heading(12.0, "primary", 6.0));

        Self {
            page: PageConfig::default(),
            palette,
            timestamp: TextStyle {
                size: 8.0,
                color: "muted".to_string(),
                gap_after: 4.0,
                ..TextStyle::default()
            },
            title: TextStyle {
                centered: true,
                ..heading(20.0, "primary", 16.0)
            },
            rule: RuleStyle::default(),
            headings,
            paragraph: TextStyle {
                size: 10.0,
                line_height: 1.2,
                gap_after: 8.0,
                ..TextStyle::default()
            },
            notes_label: TextStyle {
                font: FontRef::bold(),
                size: 10.0,
                gap_after: 4.0,
                ..TextStyle::default()
            },
            table_header: TextStyle {
                font: FontRef::bold(),
                size: 9.0,
                padding: 4.0,
                centered: true,
                background: boxed("light"),
                ..TextStyle::default()
            },
            table_body: TextStyle {
                size: 9.0,
                padding: 4.0,
                centered: true,
                background: boxed("white"),
                ..TextStyle::default()
            },
            table_gap: 14.0,
            remark_label: TextStyle {
                font: FontRef::bold(),
                size: 10.0,
                gap_after: 4.0,
                ..TextStyle::default()
            },
            remark_body: TextStyle {
                size: 9.0,
                line_height: 1.2,
                padding: 6.0,
                background: boxed("light"),
                gap_after: 14.0,
                ..TextStyle::default()
            },
        }
    }
}

// ── Resolved styles ─────────────────────────────────────────────

/// A background with its palette colors looked up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub fill: Option<Color>,
    pub border: Option<Color>,
    pub border_width: f64,
    pub opacity: f64,
}

/// A text style with its palette color and font looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTextStyle {
    pub font: FontKey,
    pub size: f64,
    pub line_height: f64,
    pub color: Color,
    pub padding: f64,
    pub centered: bool,
    pub min_height: f64,
    pub background: Option<Background>,
    pub gap_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub color: Color,
    pub thickness: f64,
    pub gap_after: f64,
}

/// Every style of a report, resolved against a palette and a font context.
#[derive(Debug, Clone)]
pub struct Theme {
    pub timestamp: ResolvedTextStyle,
    pub title: ResolvedTextStyle,
    pub rule: ResolvedRule,
    headings: BTreeMap<u8, ResolvedTextStyle>,
    pub paragraph: ResolvedTextStyle,
    pub notes_label: ResolvedTextStyle,
    pub table_header: ResolvedTextStyle,
    pub table_body: ResolvedTextStyle,
    pub table_gap: f64,
    pub remark_label: ResolvedTextStyle,
    pub remark_body: ResolvedTextStyle,
}

impl Theme {
    /// Resolve every color and font reference in `style`.
    pub fn resolve(style: &ReportStyle, fonts: &FontContext) -> Result<Self, ReportError> {
        let resolver = Resolver { style, fonts };
        let headings = style
            .headings
            .iter()
            .map(|(level, s)| Ok((*level, resolver.text(&format!("headings.{level}"), s)?)))
            .collect::<Result<BTreeMap<_, _>, ReportError>>()?;

        Ok(Self {
            timestamp: resolver.text("timestamp", &style.timestamp)?,
            title: resolver.text("title", &style.title)?,
            rule: ResolvedRule {
                color: resolver.color("rule", &style.rule.color)?,
                thickness: style.rule.thickness,
                gap_after: style.rule.gap_after,
            },
            headings,
            paragraph: resolver.text("paragraph", &style.paragraph)?,
            notes_label: resolver.text("notesLabel", &style.notes_label)?,
            table_header: resolver.text("tableHeader", &style.table_header)?,
            table_body: resolver.text("tableBody", &style.table_body)?,
            table_gap: style.table_gap,
            remark_label: resolver.text("remarkLabel", &style.remark_label)?,
            remark_body: resolver.text("remarkBody", &style.remark_body)?,
        })
    }

    /// The heading style for a title level.
    pub fn heading(&self, level: u8) -> Result<&ResolvedTextStyle, ReportError> {
        self.headings
            .get(&level)
            .ok_or(ReportError::UnknownTitleLevel(level))
    }
}

struct Resolver<'a> {
    style: &'a ReportStyle,
    fonts: &'a FontContext,
}

impl Resolver<'_> {
    fn color(&self, role: &str, name: &str) -> Result<Color, ReportError> {
        self.style
            .palette
            .get(name)
            .copied()
            .ok_or_else(|| ReportError::UnknownColor {
                style: role.to_string(),
                color: name.to_string(),
            })
    }

    fn text(&self, role: &str, style: &TextStyle) -> Result<ResolvedTextStyle, ReportError> {
        let font = style.font.key();
        if !self.fonts.contains(&font) {
            return Err(ReportError::UnknownFont {
                style: role.to_string(),
                family: font.family,
                weight: font.weight,
                italic: font.italic,
            });
        }

        let background = match &style.background {
            Some(bg) => Some(Background {
                fill: bg.fill.as_deref().map(|c| self.color(role, c)).transpose()?,
                border: bg.border.as_deref().map(|c| self.color(role, c)).transpose()?,
                border_width: bg.border_width,
                opacity: bg.opacity,
            }),
            None => None,
        };

        Ok(ResolvedTextStyle {
            font,
            size: style.size,
            line_height: style.line_height,
            color: self.color(role, &style.color)?,
            padding: style.padding,
            centered: style.centered,
            min_height: style.min_height,
            background,
            gap_after: style.gap_after,
        })
    }
}
