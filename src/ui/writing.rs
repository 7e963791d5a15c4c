use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use wordflow::{
    app::App,
    flow::MAX_MULTIPLIER,
    session::Session,
    util::{format_multiplier, format_score, format_time},
};

use crate::ui::{bold, content_area, dim, italic, wrap_lines};

const LOW_TIME_SECS: u64 = 10;

fn stat(label: &str, value: String, value_style: Style) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(label.to_string(), dim())),
        Line::from(Span::styled(value, value_style)),
    ])
    .alignment(Alignment::Center)
}

/// Hotter colors as the multiplier climbs
fn multiplier_style(multiplier: f64) -> Style {
    let color = if multiplier >= MAX_MULTIPLIER {
        Color::Red
    } else if multiplier >= 3.0 {
        Color::LightRed
    } else if multiplier >= 1.5 {
        Color::Yellow
    } else {
        Color::Gray
    };
    bold().fg(color)
}

fn render_stats(session: &Session, f: &mut Frame, area: Rect) {
    let details = session.snapshot();
    let remaining = session.time_remaining_secs();

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let time_style = if remaining <= LOW_TIME_SECS {
        bold().fg(Color::Red)
    } else {
        bold()
    };

    f.render_widget(stat("time", format_time(remaining), time_style), cells[0]);
    f.render_widget(
        stat("score", format_score(details.score), bold().fg(Color::Magenta)),
        cells[1],
    );
    f.render_widget(stat("words", details.words.to_string(), bold()), cells[2]);
    f.render_widget(
        stat(
            "flow",
            format_multiplier(details.multiplier),
            multiplier_style(details.multiplier),
        ),
        cells[3],
    );
}

fn render_text(draft: &str, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);

    let cursor = Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED));
    let text = if draft.is_empty() {
        Text::from(Line::from(vec![
            cursor,
            Span::styled(" Start typing...", italic().add_modifier(Modifier::DIM)),
        ]))
    } else {
        let mut rows = wrap_lines(draft, inner.width);
        // The cursor cell goes on a fresh row when the last one is full
        if rows.last().is_some_and(|row| row.width() >= usize::from(inner.width)) {
            rows.push(String::new());
        }
        let mut lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
        if let Some(last) = lines.last_mut() {
            last.push_span(cursor);
        }
        Text::from(lines)
    };

    // Rows are pre-wrapped so the newest one is always in view
    let rows = u16::try_from(text.lines.len()).unwrap_or(u16::MAX);
    let scroll = rows.saturating_sub(inner.height);

    f.render_widget(Paragraph::new(text).block(block).scroll((scroll, 0)), area);
}

pub fn render(app: &App, f: &mut Frame) {
    let Some(session) = app.session() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // stats
            Constraint::Length(1),
            Constraint::Min(3), // text
            Constraint::Length(1), // legend
        ])
        .split(content_area(f.area()));

    render_stats(session, f, chunks[0]);
    render_text(app.draft(), f, chunks[2]);

    f.render_widget(
        Paragraph::new(Span::styled("(esc) give up", italic())),
        chunks[3],
    );
}
