pub mod charting;
pub mod layout;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};
use typetest::{
    session::{TIME_OPTIONS, WORD_COUNT_OPTIONS},
    Outcome, Session, Status, TestMode,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Styles {
    bold: Style,
    correct: Style,
    incorrect: Style,
    dim: Style,
    cursor: Style,
    highlight: Style,
    italic: Style,
}

impl Default for Styles {
    fn default() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().patch(bold).add_modifier(Modifier::DIM);
        Self {
            bold,
            correct: Style::default().patch(bold).fg(Color::Green),
            incorrect: Style::default().patch(bold).fg(Color::Red),
            dim,
            cursor: Style::default().patch(dim).add_modifier(Modifier::UNDERLINED),
            highlight: Style::default().patch(bold).fg(Color::Yellow),
            italic: Style::default().add_modifier(Modifier::ITALIC),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let styles = Styles::default();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // mode and options
                Constraint::Length(1), // live stats
                Constraint::Length(1), // padding
                Constraint::Min(1),    // words or results
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(options_line(session, &styles))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(stats_line(session, &styles))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        if session.has_finished() {
            render_results(session, chunks[3], buf, &styles);
        } else {
            render_words(session, chunks[3], buf, &styles);
        }

        let legend = if session.status() == Status::Started {
            "(tab) restart / (esc)ape"
        } else {
            "(tab) restart / (shift+tab) mode / (←/→) option / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, styles.italic))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }
}

fn options_line(session: &Session, styles: &Styles) -> Line<'static> {
    let config = session.config();

    if session.status() != Status::Waiting {
        let summary = match config.mode {
            TestMode::Time => format!("time {}s", config.duration_secs),
            TestMode::Words => format!("words {}", config.word_count),
        };
        return Line::from(Span::styled(summary, styles.dim));
    }

    let pick = |active: bool| if active { styles.highlight } else { styles.dim };
    let mut spans = vec![
        Span::styled("time", pick(config.mode == TestMode::Time)),
        Span::raw(" "),
        Span::styled("words", pick(config.mode == TestMode::Words)),
        Span::raw("   "),
    ];

    let values: Vec<(String, bool)> = match config.mode {
        TestMode::Time => TIME_OPTIONS
            .iter()
            .map(|&s| (format!("{s}s"), s == config.duration_secs))
            .collect(),
        TestMode::Words => WORD_COUNT_OPTIONS
            .iter()
            .map(|&n| (n.to_string(), n == config.word_count))
            .collect(),
    };
    for (i, (label, active)) in values.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(label, pick(active)));
    }

    Line::from(spans)
}

fn stats_line(session: &Session, styles: &Styles) -> Line<'static> {
    let scores = session.scores();
    let mut parts = vec![match session.mode() {
        TestMode::Time => format!("Time: {}s", session.remaining_secs().unwrap_or(0)),
        TestMode::Words => {
            let (done, target) = session.progress();
            format!("Words: {done}/{target}")
        }
    }];
    parts.push(format!("WPM: {}", scores.net_wpm));
    parts.push(format!("Accuracy: {}%", scores.accuracy));
    if session.has_started() {
        parts.push(format!("Raw WPM: {}", scores.raw_wpm));
    }

    Line::from(Span::styled(parts.join("   "), styles.bold))
}

/// Spans for a single word, coloured by its correctness record.
fn word_spans(session: &Session, index: usize, styles: &Styles) -> Vec<Span<'static>> {
    let target = &session.words()[index];
    let active = session.active_word_index();

    if index > active {
        return vec![Span::styled(target.clone(), styles.dim)];
    }

    let record = session.record(index).unwrap_or(&[]);
    let outcome_style = |outcome: Option<&Outcome>| match outcome {
        Some(Outcome::Correct) => styles.correct,
        Some(Outcome::Incorrect) => styles.incorrect,
        Some(Outcome::Pending) | None => styles.dim,
    };

    if index < active {
        let missed = session.word_results().get(index) == Some(&false);
        return target
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let mut style = outcome_style(record.get(i));
                if missed {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Span::styled(c.to_string(), style)
            })
            .collect();
    }

    let buffer: Vec<char> = session.buffer().chars().collect();
    let target_len = target.chars().count();
    let mut spans: Vec<Span> = target
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let style = if i == buffer.len() {
                styles.cursor
            } else {
                outcome_style(record.get(i))
            };
            Span::styled(c.to_string(), style)
        })
        .collect();

    if buffer.len() > target_len {
        let extra: String = buffer[target_len..].iter().collect();
        spans.push(Span::styled(extra, styles.incorrect));
    }
    if buffer.len() >= target_len {
        spans.push(Span::styled(" ", styles.cursor));
    }

    spans
}

fn render_words(session: &Session, area: Rect, buf: &mut Buffer, styles: &Styles) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let words: Vec<Vec<Span>> = (0..session.words().len())
        .map(|i| word_spans(session, i, styles))
        .collect();
    let widths: Vec<usize> = words
        .iter()
        .map(|spans| spans.iter().map(|s| s.content.width()).sum())
        .collect();

    let lines = layout::wrap_lines(&widths, area.width as usize);
    let active_line = layout::line_of(&lines, session.active_word_index());
    let first = layout::first_visible_line(active_line, area.height as usize);

    let mut words: Vec<Option<Vec<Span>>> = words.into_iter().map(Some).collect();
    let text: Vec<Line> = lines
        .iter()
        .skip(first)
        .take(area.height as usize)
        .map(|range| {
            let mut spans = Vec::new();
            for i in range.clone() {
                if i > range.start {
                    spans.push(Span::raw(" "));
                }
                spans.extend(words[i].take().unwrap_or_default());
            }
            Line::from(spans)
        })
        .collect();

    let alignment = if lines.len() == 1 {
        Alignment::Center
    } else {
        Alignment::Left
    };
    Paragraph::new(text).alignment(alignment).render(area, buf);
}

fn render_results(session: &Session, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // heading
            Constraint::Length(1), // time taken
            Constraint::Length(1), // summary
            Constraint::Length(1), // padding
            Constraint::Min(1),    // chart
        ])
        .split(area);

    Paragraph::new(Span::styled("Test Complete!", styles.highlight))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Some(taken) = session.time_taken().filter(|t| *t > 0.0) {
        Paragraph::new(Span::styled(format!("Time Taken: {taken:.1}s"), styles.bold))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }

    let scores = session.scores();
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {} raw   {}% acc   {:.2} sd",
            scores.net_wpm,
            scores.raw_wpm,
            scores.accuracy,
            session.consistency()
        ),
        styles.bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let (overall_duration, highest_wpm) = charting::compute_chart_params(
        session.samples(),
        Some(session.config().duration_secs),
    );
    let wpm: Vec<(f64, f64)> = session.samples().iter().map(|p| p.wpm_coord()).collect();
    let raw: Vec<(f64, f64)> = session.samples().iter().map(|p| p.raw_coord()).collect();
    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::DarkGray))
            .graph_type(GraphType::Line)
            .data(&raw),
        Dataset::default()
            .name("wpm")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", styles.bold),
                    Span::styled(charting::format_label(overall_duration), styles.bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", styles.bold),
                    Span::styled(charting::format_label(highest_wpm), styles.bold),
                ]),
        )
        .render(chunks[4], buf);
}
