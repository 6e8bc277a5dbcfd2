//! # Report Assembly
//!
//! Walks a report's blocks in order and threads the flow cursor through
//! them. Each block is measured, split and drawn, and the cursor moves down
//! by the height the block consumed plus its style's gap.
//!
//! The header comes first: an optional generation timestamp, a rule across
//! the content width, then the centered report title.

pub mod statistics;

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::backend::PageBackend;
use crate::error::ReportError;
use crate::font::{FontContext, MetricsProvider};
use crate::layout::{self, table, PageGeometry};
use crate::model::{ContentBlock, Labels, Report, Response};
use crate::style::{ReportStyle, ResolvedTextStyle, Theme};
use crate::text::{LayoutOptions, TextBlock, TextMeasurer};

pub use statistics::{QuestionCounts, Statistics};

/// Lays a [`Report`] out onto a [`PageBackend`].
pub struct ReportGenerator<'m, M: MetricsProvider + ?Sized> {
    geometry: PageGeometry,
    theme: Theme,
    measurer: TextMeasurer<'m, M>,
}

impl<'m> ReportGenerator<'m, FontContext> {
    /// Resolve `style` against `fonts`. Fails on any undefined color or
    /// unregistered font.
    pub fn new(style: &ReportStyle, fonts: &'m FontContext) -> Result<Self, ReportError> {
        let theme = Theme::resolve(style, fonts)?;
        Ok(Self::with_metrics(PageGeometry::new(&style.page), theme, fonts))
    }
}

impl<'m, M: MetricsProvider + ?Sized> ReportGenerator<'m, M> {
    pub fn with_metrics(geometry: PageGeometry, theme: Theme, metrics: &'m M) -> Self {
        Self {
            geometry,
            measurer: TextMeasurer::new(metrics, geometry.content_width),
            theme,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Draw the whole report. Returns the final flow offset.
    ///
    /// Every block is checked before the first page is created, so a
    /// configuration error never leaves a half-drawn document behind.
    pub fn generate<B: PageBackend + ?Sized>(
        &self,
        report: &Report,
        backend: &mut B,
    ) -> Result<f64, ReportError> {
        self.validate(&report.blocks)?;
        let statistics = Statistics::build(&report.blocks, &report.responses);

        backend.ensure_page(0);
        let mut y = 0.0;

        if let Some(at) = report.generated_at {
            let line = timestamp_line(&report.labels, at)?;
            y += self.draw_styled(backend, &line, &self.theme.timestamp, y)?;
        }

        let rule = &self.theme.rule;
        layout::draw_rule(&self.geometry, backend, y, rule.thickness, rule.color)?;
        y += rule.thickness + rule.gap_after;

        y += self.draw_styled(backend, &report.title, &self.theme.title, y)?;

        for block in &report.blocks {
            log::debug!(kind = block.kind_name(), y; "Laying out block");
            y += match block {
                ContentBlock::Title { level, text } => {
                    self.draw_styled(backend, text, self.theme.heading(*level)?, y)?
                }
                ContentBlock::Paragraph { text } => {
                    self.draw_styled(backend, text, &self.theme.paragraph, y)?
                }
                ContentBlock::Notes { identifier, text, .. } => {
                    let label = self.draw_styled(backend, text, &self.theme.notes_label, y)?;
                    let counts = statistics.question(identifier).cloned().unwrap_or_default();
                    label
                        + self.draw_table(
                            backend,
                            &counts,
                            statistics.participants(),
                            &report.labels,
                            y + label,
                        )?
                }
                ContentBlock::Remark { identifier, text } => {
                    let label = self.draw_styled(backend, text, &self.theme.remark_label, y)?;
                    let body = collect_remarks(identifier, &report.responses);
                    label + self.draw_styled(backend, &body, &self.theme.remark_body, y + label)?
                }
            };
        }

        log::info!(blocks = report.blocks.len(), end = y; "Report laid out");
        Ok(y)
    }

    fn validate(&self, blocks: &[ContentBlock]) -> Result<(), ReportError> {
        for block in blocks {
            if let ContentBlock::Title { level, .. } = block {
                self.theme.heading(*level)?;
            }
        }
        Ok(())
    }

    /// Lay `text` out in `style` across the content width at `y` and return
    /// the flow height used, gap included.
    fn draw_styled<B: PageBackend + ?Sized>(
        &self,
        backend: &mut B,
        text: &str,
        style: &ResolvedTextStyle,
        y: f64,
    ) -> Result<f64, ReportError> {
        let block = TextBlock::Raw {
            text: text.to_string(),
            options: LayoutOptions::from(style),
        };
        let consumed =
            layout::draw_text_block(&self.geometry, &self.measurer, backend, block, 0.0, y)?;
        Ok(consumed + style.gap_after)
    }

    /// Draw a results table at `y`: one column per declared value, then the
    /// total and participant columns. Returns the flow height used, gap
    /// included.
    fn draw_table<B: PageBackend + ?Sized>(
        &self,
        backend: &mut B,
        counts: &QuestionCounts,
        participants: usize,
        labels: &Labels,
        y: f64,
    ) -> Result<f64, ReportError> {
        let headers: Vec<&str> = counts
            .iter()
            .map(|(value, _)| value)
            .chain([
                labels.total_responses.as_str(),
                labels.participant_count.as_str(),
            ])
            .collect();
        let body: Vec<String> = counts
            .iter()
            .map(|(_, n)| n)
            .chain([counts.total(), participants])
            .map(|n| n.to_string())
            .collect();

        let header_style = LayoutOptions::from(&self.theme.table_header);
        let body_style = LayoutOptions::from(&self.theme.table_body);
        let content_width = self.measurer.content_width();
        let initial = content_width / headers.len() as f64;

        let mut natural = Vec::with_capacity(headers.len());
        for (header, value) in headers.iter().zip(&body) {
            let h = self
                .measurer
                .measure(header, &header_style.clone().with_width(initial))?;
            let b = self
                .measurer
                .measure(value, &body_style.clone().with_width(initial))?;
            natural.push(h.width.max(b.width));
        }
        let widths = table::resolve_column_widths(&natural, content_width);
        let offsets = table::column_offsets(&widths, 0.0);

        let header_row = self.measure_row(&headers, &widths, &offsets, &header_style)?;
        let body_row = self.measure_row(&body, &widths, &offsets, &body_style)?;

        let header_height =
            layout::draw_row(&self.geometry, &self.measurer, backend, header_row, y)?;
        let body_height = layout::draw_row(
            &self.geometry,
            &self.measurer,
            backend,
            body_row,
            y + header_height,
        )?;

        log::debug!(columns = widths.len(), header_height, body_height; "Drew results table");
        Ok(header_height + body_height + self.theme.table_gap)
    }

    /// Measure one row at the final column widths, every cell raised to the
    /// tallest, paired with its column offset.
    fn measure_row<S: AsRef<str>>(
        &self,
        cells: &[S],
        widths: &[f64],
        offsets: &[f64],
        options: &LayoutOptions,
    ) -> Result<Vec<(TextBlock, f64)>, ReportError> {
        let mut measured = Vec::with_capacity(cells.len());
        for (text, width) in cells.iter().zip(widths) {
            let options = options.clone().with_width(*width);
            measured.push(self.measurer.measure(text.as_ref(), &options)?);
        }
        let row_height = measured.iter().map(|c| c.height).fold(options.height, f64::max);
        Ok(measured
            .into_iter()
            .zip(offsets)
            .map(|(cell, x)| (TextBlock::Computed(cell.with_min_height(row_height)), *x))
            .collect())
    }
}

fn timestamp_line(labels: &Labels, at: NaiveDateTime) -> Result<String, ReportError> {
    let mut line = format!("{} ", labels.generated_at);
    write!(line, "{}", at.format(&labels.timestamp_format))
        .map_err(|_| ReportError::TimestampFormat(labels.timestamp_format.clone()))?;
    Ok(line)
}

/// Every respondent's non-empty free-text answer to `identifier`, one per
/// line, in response order.
pub fn collect_remarks(identifier: &str, responses: &[Response]) -> String {
    responses
        .iter()
        .filter_map(|r| r.answer(identifier)?.as_text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCommand, RecordingBackend};
    use crate::model::{Answer, Edges, PageConfig, PageSize};
    use crate::text::tests::MonoMetrics;
    use float_cmp::approx_eq;

    const MONO: MonoMetrics = MonoMetrics { char_width: 5.0 };

    fn style() -> ReportStyle {
        ReportStyle {
            page: PageConfig {
                size: PageSize::Custom {
                    width: 600.0,
                    height: 800.0,
                },
                margin: Edges::symmetric(50.0, 50.0),
            },
            ..ReportStyle::default()
        }
    }

    fn generator() -> ReportGenerator<'static, MonoMetrics> {
        let style = style();
        let theme = Theme::resolve(&style, &FontContext::new()).unwrap();
        ReportGenerator::with_metrics(PageGeometry::new(&style.page), theme, &MONO)
    }

    fn remark_response(text: &str) -> Response {
        let mut r = Response::default();
        r.answers
            .insert("r1".to_string(), Answer::Text(text.to_string()));
        r
    }

    fn all_texts(backend: &RecordingBackend) -> Vec<String> {
        backend
            .pages()
            .iter()
            .flat_map(|p| p.texts())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn empty_report_still_has_a_page() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let end = generator()
            .generate(&Report::default(), &mut backend)
            .unwrap();
        assert_eq!(backend.pages().len(), 1);
        assert!(end > 0.0);
        assert!(matches!(
            backend.pages()[0].commands[0],
            DrawCommand::Line { .. }
        ));
    }

    #[test]
    fn timestamp_comes_first() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            title: "Bilan".to_string(),
            generated_at: NaiveDateTime::parse_from_str("2024-03-05 14:30", "%Y-%m-%d %H:%M").ok(),
            ..Report::default()
        };
        generator().generate(&report, &mut backend).unwrap();
        assert_eq!(
            all_texts(&backend),
            vec!["Document généré le 05/03/2024 à 14:30", "Bilan"]
        );
    }

    #[test]
    fn unknown_title_level_draws_nothing() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            blocks: vec![
                ContentBlock::Paragraph {
                    text: "avant".to_string(),
                },
                ContentBlock::Title {
                    level: 9,
                    text: "x".to_string(),
                },
            ],
            ..Report::default()
        };
        let err = generator().generate(&report, &mut backend).unwrap_err();
        assert!(matches!(err, ReportError::UnknownTitleLevel(9)));
        assert!(backend.pages().is_empty());
    }

    #[test]
    fn blocks_are_drawn_in_order() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            title: "T".to_string(),
            blocks: vec![
                ContentBlock::Title {
                    level: 1,
                    text: "Partie 1".to_string(),
                },
                ContentBlock::Paragraph {
                    text: "Introduction".to_string(),
                },
                ContentBlock::Title {
                    level: 2,
                    text: "Détails".to_string(),
                },
            ],
            ..Report::default()
        };
        generator().generate(&report, &mut backend).unwrap();
        assert_eq!(
            all_texts(&backend),
            vec!["T", "Partie 1", "Introduction", "Détails"]
        );
    }

    #[test]
    fn remarks_are_gathered_into_one_box() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            blocks: vec![ContentBlock::Remark {
                identifier: "r1".to_string(),
                text: "Commentaires".to_string(),
            }],
            responses: vec![
                remark_response("Très bien"),
                remark_response("   "),
                remark_response("À refaire "),
            ],
            ..Report::default()
        };
        generator().generate(&report, &mut backend).unwrap();
        let texts = all_texts(&backend);
        assert_eq!(&texts[texts.len() - 3..], ["Commentaires", "Très bien", "À refaire"]);
    }

    #[test]
    fn collect_remarks_skips_non_text() {
        let mut numeric = Response::default();
        numeric
            .answers
            .insert("r1".to_string(), Answer::Number(3.into()));
        let responses = vec![remark_response("un"), numeric, remark_response("deux")];
        assert_eq!(collect_remarks("r1", &responses), "un\ndeux");
        assert_eq!(collect_remarks("r2", &responses), "");
    }

    #[test]
    fn results_table_fills_the_content_width() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            blocks: vec![ContentBlock::Notes {
                identifier: "q1".to_string(),
                text: "Satisfaction".to_string(),
                possible_values: vec!["Oui".to_string(), "Non".to_string()],
            }],
            responses: vec![Response {
                answers: [("q1".to_string(), Answer::Text("Oui".to_string()))]
                    .into_iter()
                    .collect(),
            }],
            ..Report::default()
        };
        generator().generate(&report, &mut backend).unwrap();

        let page = &backend.pages()[0];
        let cells: Vec<(f64, f64, f64)> = page
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { x, y, width, .. } => Some((*x, *y, *width)),
                _ => None,
            })
            .collect();
        // four header cells, four body cells
        assert_eq!(cells.len(), 8);
        let header_row: f64 = cells[..4].iter().map(|c| c.2).sum();
        let body_row: f64 = cells[4..].iter().map(|c| c.2).sum();
        assert!(approx_eq!(f64, header_row, 500.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, body_row, 500.0, epsilon = 1e-9));
        assert_eq!(cells[0].0, 50.0);
        // every header cell on one baseline, body cells below
        assert!(cells[..4].iter().all(|c| c.1 == cells[0].1));
        assert!(cells[4].1 < cells[0].1);

        let texts = page.texts();
        let at = texts.iter().position(|t| *t == "Oui").unwrap();
        assert_eq!(
            &texts[at..],
            ["Oui", "Non", "Total des réponses", "Nombre de participants", "1", "0", "1", "1"]
        );
    }

    fn rects(page: &crate::backend::RecordedPage) -> Vec<(f64, f64, f64)> {
        page.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { y, height, .. } => Some((*y, *height, *y + *height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeated_values_give_one_column() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let report = Report {
            blocks: vec![ContentBlock::Notes {
                identifier: "q1".to_string(),
                text: "Satisfaction".to_string(),
                possible_values: vec!["Oui".to_string(), "Oui".to_string(), "Non".to_string()],
            }],
            responses: vec![Response {
                answers: [("q1".to_string(), Answer::Text("Oui".to_string()))]
                    .into_iter()
                    .collect(),
            }],
            ..Report::default()
        };
        generator().generate(&report, &mut backend).unwrap();

        let page = &backend.pages()[0];
        assert_eq!(rects(page).len(), 8);
        let texts = page.texts();
        let at = texts.iter().position(|t| *t == "Oui").unwrap();
        assert_eq!(&texts[at + 4..], ["1", "0", "1", "1"]);
    }

    #[test]
    fn header_row_crossing_a_page_keeps_even_backgrounds() {
        let generator = generator();
        let mut backend = RecordingBackend::new(600.0, 800.0);
        backend.ensure_page(0);
        let blocks = vec![ContentBlock::Notes {
            identifier: "q1".to_string(),
            text: String::new(),
            possible_values: vec![
                "un libellé de réponse nettement plus long que les autres".to_string(),
                "A".to_string(),
            ],
        }];
        let statistics = Statistics::build(&blocks, &[]);
        let counts = statistics.question("q1").unwrap();
        // 15 points left on page 0, the wrapped header needs more
        generator
            .draw_table(&mut backend, counts, 0, &Labels::default(), 685.0)
            .unwrap();
        assert_eq!(backend.pages().len(), 2);

        let top = rects(&backend.pages()[0]);
        assert_eq!(top.len(), 4);
        assert!(top
            .iter()
            .all(|r| r.0 == top[0].0 && approx_eq!(f64, r.1, 15.0, epsilon = 1e-9)));

        let bottom = rects(&backend.pages()[1]);
        assert_eq!(bottom.len(), 8);
        let (header, body) = bottom.split_at(4);
        assert!(header
            .iter()
            .all(|r| approx_eq!(f64, r.0, header[0].0, epsilon = 1e-9)
                && approx_eq!(f64, r.1, header[0].1, epsilon = 1e-9)));
        // the body row starts where the header row ends
        assert!(body
            .iter()
            .all(|r| approx_eq!(f64, r.2, header[0].0, epsilon = 1e-9)));
    }

    #[test]
    fn long_paragraph_flows_onto_later_pages() {
        let mut backend = RecordingBackend::new(600.0, 800.0);
        let text = vec!["ligne de texte"; 150].join("\n");
        let report = Report {
            blocks: vec![ContentBlock::Paragraph { text }],
            ..Report::default()
        };
        let end = generator().generate(&report, &mut backend).unwrap();
        assert!(backend.pages().len() >= 2);
        let lines: usize = backend
            .pages()
            .iter()
            .map(|p| p.texts().iter().filter(|t| **t == "ligne de texte").count())
            .sum();
        assert_eq!(lines, 150);
        assert_eq!(backend.pages().len(), generator().geometry().page_index_of(end) + 1);
    }

    #[test]
    fn invalid_timestamp_format_is_reported() {
        let labels = Labels {
            timestamp_format: "%Q".to_string(),
            ..Labels::default()
        };
        let at = NaiveDateTime::parse_from_str("2024-03-05 14:30", "%Y-%m-%d %H:%M").unwrap();
        assert!(matches!(
            timestamp_line(&labels, at),
            Err(ReportError::TimestampFormat(_))
        ));
    }
}
