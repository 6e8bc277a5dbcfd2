//! # Text Measurement
//!
//! Greedy line breaking and block sizing.
//!
//! Break opportunities come from UAX#14: a line may end wherever the
//! algorithm allows one, must end at a mandatory break (newline), and a
//! word wider than the whole line is cut between characters. Widths come
//! from a [`MetricsProvider`], so the same text and options always measure
//! the same way.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::error::ReportError;
use crate::font::{FontKey, MetricsProvider};
use crate::style::{Background, Color, ResolvedTextStyle};

/// Options for measuring (and later drawing) one text block.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub font: FontKey,
    pub size: f64,
    /// Multiplier applied to `size` when asking for the line height.
    pub line_height: f64,
    pub color: Color,
    /// Block width. `None` means the full content width.
    pub width: Option<f64>,
    /// Minimum block height.
    pub height: f64,
    pub padding: f64,
    pub centered: bool,
    pub background: Option<Background>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            font: FontKey::helvetica(400),
            size: 12.0,
            line_height: 1.0,
            color: Color::BLACK,
            width: None,
            height: 0.0,
            padding: 0.0,
            centered: false,
            background: None,
        }
    }
}

impl From<&ResolvedTextStyle> for LayoutOptions {
    fn from(style: &ResolvedTextStyle) -> Self {
        Self {
            font: style.font.clone(),
            size: style.size,
            line_height: style.line_height,
            color: style.color,
            width: None,
            height: style.min_height,
            padding: style.padding,
            centered: style.centered,
            background: style.background,
        }
    }
}

impl LayoutOptions {
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f64,
}

/// The result of measuring a text block. Immutable once built; callers may
/// keep it and hand it back through [`TextBlock::Computed`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub lines: Vec<Line>,
    pub line_height: f64,
    /// `line_height * lines.len()`.
    pub text_height: f64,
    /// Baseline-to-bottom distance of a line. Negative.
    pub descender: f64,
    /// Widest line plus padding, capped at the requested width.
    pub width: f64,
    /// Text height plus padding, raised to the requested minimum.
    pub height: f64,
    /// The requested width the lines were wrapped into (padding included).
    pub frame_width: f64,
    pub padding: f64,
    pub centered: bool,
    pub font: FontKey,
    pub size: f64,
    pub color: Color,
    pub background: Option<Background>,
}

impl MeasuredBlock {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Raise the block to at least `height`, as a minimum height given at
    /// measure time would.
    pub fn with_min_height(mut self, height: f64) -> Self {
        self.height = self.height.max(height);
        self
    }
}

/// Text to lay out: raw, or already measured.
#[derive(Debug, Clone)]
pub enum TextBlock {
    Raw {
        text: String,
        options: LayoutOptions,
    },
    Computed(MeasuredBlock),
}

/// Wraps and sizes text blocks against a metrics provider.
pub struct TextMeasurer<'m, M: MetricsProvider + ?Sized> {
    metrics: &'m M,
    content_width: f64,
}

impl<'m, M: MetricsProvider + ?Sized> TextMeasurer<'m, M> {
    pub fn new(metrics: &'m M, content_width: f64) -> Self {
        Self {
            metrics,
            content_width,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.content_width
    }

    /// Measure a block, or hand back one that is already measured.
    pub fn resolve(&self, block: TextBlock) -> Result<MeasuredBlock, ReportError> {
        match block {
            TextBlock::Raw { text, options } => self.measure(&text, &options),
            TextBlock::Computed(measured) => Ok(measured),
        }
    }

    /// Wrap `text` and compute its bounding box.
    pub fn measure(&self, text: &str, options: &LayoutOptions) -> Result<MeasuredBlock, ReportError> {
        let width = options.width.unwrap_or(self.content_width);
        let available = width - 2.0 * options.padding;
        if available <= 0.0 {
            return Err(ReportError::NonPositiveWidth {
                width,
                padding: options.padding,
            });
        }

        let lines = self.break_into_lines(text, &options.font, options.size, available);
        let line_height = self
            .metrics
            .line_height_at(&options.font, options.size * options.line_height);
        let text_height = line_height * lines.len() as f64;
        let widest = lines.iter().map(|l| l.width).fold(0.0, f64::max);

        Ok(MeasuredBlock {
            line_height,
            text_height,
            descender: self.metrics.descender_at(&options.font, options.size),
            width: (widest + 2.0 * options.padding).min(width),
            height: options.height.max(text_height + 2.0 * options.padding),
            frame_width: width,
            padding: options.padding,
            centered: options.centered,
            font: options.font.clone(),
            size: options.size,
            color: options.color,
            background: options.background,
            lines,
        })
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Always returns at least one line; empty text gives one empty line.
    pub fn break_into_lines(
        &self,
        text: &str,
        font: &FontKey,
        size: f64,
        max_width: f64,
    ) -> Vec<Line> {
        let mut lines = Vec::new();
        if text.is_empty() {
            lines.push(Line {
                text: String::new(),
                width: 0.0,
            });
            return lines;
        }

        let fits = |s: &str| self.metrics.width_of(s.trim_end(), font, size) <= max_width;

        let mut start = 0;
        // End of the longest prefix of the current line that ends on a break
        // opportunity and still fits.
        let mut last_fit: Option<usize> = None;

        for (pos, opportunity) in linebreaks(text) {
            if fits(&text[start..pos]) {
                last_fit = Some(pos);
            } else {
                if let Some(fit) = last_fit.take() {
                    lines.push(self.make_line(&text[start..fit], font, size));
                    start = fit;
                }
                start = self.break_word(text, start, pos, font, size, max_width, &mut lines);
                if start < pos {
                    last_fit = Some(pos);
                }
            }

            if matches!(opportunity, BreakOpportunity::Mandatory) {
                lines.push(self.make_line(&text[start..pos], font, size));
                start = pos;
                last_fit = None;
            }
        }

        if start < text.len() {
            lines.push(self.make_line(&text[start..], font, size));
        }
        if lines.is_empty() {
            lines.push(Line {
                text: String::new(),
                width: 0.0,
            });
        }
        lines
    }

    /// Cut `text[start..end]` between characters until the rest fits.
    /// Pushes the full lines and returns where the remainder starts.
    #[allow(clippy::too_many_arguments)]
    fn break_word(
        &self,
        text: &str,
        start: usize,
        end: usize,
        font: &FontKey,
        size: f64,
        max_width: f64,
        lines: &mut Vec<Line>,
    ) -> usize {
        let mut line_start = start;
        for (offset, ch) in text[start..end].char_indices() {
            let idx = start + offset;
            let candidate = &text[line_start..idx + ch.len_utf8()];
            if idx > line_start
                && self.metrics.width_of(candidate.trim_end(), font, size) > max_width
            {
                lines.push(self.make_line(&text[line_start..idx], font, size));
                line_start = idx;
            }
        }
        line_start
    }

    fn make_line(&self, raw: &str, font: &FontKey, size: f64) -> Line {
        let text = raw.trim_end().to_string();
        let width = self.metrics.width_of(&text, font, size);
        Line { text, width }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character is `char_width` wide; lines are `1.0 * size` tall.
    pub(crate) struct MonoMetrics {
        pub char_width: f64,
    }

    impl MetricsProvider for MonoMetrics {
        fn width_of(&self, text: &str, _font: &FontKey, _size: f64) -> f64 {
            text.chars().count() as f64 * self.char_width
        }

        fn line_height_at(&self, _font: &FontKey, size: f64) -> f64 {
            size
        }

        fn descender_at(&self, _font: &FontKey, size: f64) -> f64 {
            -0.2 * size
        }
    }

    const MONO: MonoMetrics = MonoMetrics { char_width: 10.0 };

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn wraps_at_spaces() {
        let measurer = TextMeasurer::new(&MONO, 100.0);
        let block = measurer
            .measure("aaa bbb ccc ddd", &LayoutOptions::default())
            .unwrap();
        // 10 chars per line at most
        assert_eq!(texts(&block.lines), vec!["aaa bbb", "ccc ddd"]);
        assert_eq!(block.lines[0].width, 70.0);
        assert_eq!(block.line_count(), 2);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let measurer = TextMeasurer::new(&MONO, 100.0);
        let block = measurer.measure("", &LayoutOptions::default()).unwrap();
        assert_eq!(block.line_count(), 1);
        assert_eq!(block.lines[0].width, 0.0);
        assert_eq!(block.text_height, 12.0);
        assert_eq!(block.height, 12.0);
    }

    #[test]
    fn newlines_force_breaks() {
        let measurer = TextMeasurer::new(&MONO, 500.0);
        let block = measurer
            .measure("premier\ndeuxième\ntroisième", &LayoutOptions::default())
            .unwrap();
        assert_eq!(texts(&block.lines), vec!["premier", "deuxième", "troisième"]);
    }

    #[test]
    fn long_word_is_cut() {
        let measurer = TextMeasurer::new(&MONO, 40.0);
        let block = measurer
            .measure("abcdefghij", &LayoutOptions::default())
            .unwrap();
        assert_eq!(texts(&block.lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn long_word_after_short_word() {
        let measurer = TextMeasurer::new(&MONO, 40.0);
        let block = measurer
            .measure("ab cdefghij kl", &LayoutOptions::default())
            .unwrap();
        assert_eq!(texts(&block.lines), vec!["ab", "cdef", "ghij", "kl"]);
    }

    #[test]
    fn box_accounts_for_padding_and_min_height() {
        let measurer = TextMeasurer::new(&MONO, 500.0);
        let options = LayoutOptions {
            padding: 5.0,
            width: Some(200.0),
            ..LayoutOptions::default()
        };
        let block = measurer.measure("abc", &options).unwrap();
        assert_eq!(block.width, 40.0);
        assert_eq!(block.height, 22.0);
        assert_eq!(block.frame_width, 200.0);

        let tall = measurer.measure("abc", &options.clone().with_height(80.0)).unwrap();
        assert_eq!(tall.height, 80.0);
        assert_eq!(block.clone().with_min_height(80.0), tall);
        assert_eq!(block.clone().with_min_height(10.0), block);
    }

    #[test]
    fn width_is_capped_by_requested_width() {
        let measurer = TextMeasurer::new(&MONO, 500.0);
        let options = LayoutOptions::default().with_width(30.0);
        let block = measurer.measure("abcdefgh", &options).unwrap();
        assert!(block.width <= 30.0);
    }

    #[test]
    fn line_height_multiplier() {
        let measurer = TextMeasurer::new(&MONO, 500.0);
        let options = LayoutOptions {
            size: 10.0,
            line_height: 1.5,
            ..LayoutOptions::default()
        };
        let block = measurer.measure("a\nb", &options).unwrap();
        assert_eq!(block.line_height, 15.0);
        assert_eq!(block.text_height, 30.0);
        assert_eq!(block.descender, -2.0);
    }

    #[test]
    fn non_positive_width_is_rejected() {
        let measurer = TextMeasurer::new(&MONO, 500.0);
        let options = LayoutOptions {
            padding: 10.0,
            width: Some(20.0),
            ..LayoutOptions::default()
        };
        assert!(matches!(
            measurer.measure("x", &options),
            Err(ReportError::NonPositiveWidth { .. })
        ));
    }

    #[test]
    fn measuring_is_idempotent_and_computed_blocks_pass_through() {
        let measurer = TextMeasurer::new(&MONO, 100.0);
        let options = LayoutOptions::default();
        let a = measurer.measure("un deux trois quatre", &options).unwrap();
        let b = measurer.measure("un deux trois quatre", &options).unwrap();
        assert_eq!(a, b);

        let resolved = measurer.resolve(TextBlock::Computed(a.clone())).unwrap();
        assert_eq!(resolved, a);

        let raw = measurer
            .resolve(TextBlock::Raw {
                text: "un deux trois quatre".to_string(),
                options,
            })
            .unwrap();
        assert_eq!(raw, a);
    }
}
