use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use wordflow::{
    analysis::Analysis,
    app::{AnalysisState, App},
    session::RoundEnd,
    util::{format_multiplier, format_score, format_time},
};

use crate::ui::{accent, bold, content_area, dim, italic, row_count, wrap_lines};

const EMPTY_ROUND: &str = "You didn't write anything this round.";

fn summary_line(end: &RoundEnd) -> Line<'static> {
    let details = &end.details;
    Line::from(vec![
        Span::styled(format!("{} words", details.words), bold()),
        Span::styled("   ", dim()),
        Span::styled(format!("{} unique", details.unique_words), bold()),
        Span::styled("   ", dim()),
        Span::styled(
            format!("{} flow", format_multiplier(details.multiplier)),
            bold(),
        ),
        Span::styled("   ", dim()),
        Span::styled(format_time(end.duration_secs), dim()),
    ])
}

fn analysis_lines(analysis: &Analysis) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(analysis.summary.clone(), italic())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Sentiment: ", dim()),
            Span::styled(analysis.sentiment.clone(), bold().fg(Color::Cyan)),
        ]),
    ];

    lines.extend(analysis.stats.iter().map(|stat| {
        Line::from(vec![
            Span::styled(format!("{}: ", stat.name), dim()),
            Span::styled(stat.value.clone(), bold()),
        ])
    }));

    if !analysis.interesting_words.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Interesting words: ", dim()),
            Span::styled(
                analysis.interesting_words.iter().join(", "),
                bold().fg(Color::Magenta),
            ),
        ]));
    }

    lines
}

fn render_analysis(app: &App, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Analysis ");

    let lines = match app.analysis() {
        AnalysisState::Idle if app.can_analyze() => vec![Line::from(Span::styled(
            "Press (a) for a quick read on what you wrote.",
            italic(),
        ))],
        AnalysisState::Idle => vec![Line::from(Span::styled("Nothing to analyze.", dim()))],
        AnalysisState::Loading => vec![Line::from(Span::styled(
            "Analyzing...",
            italic().fg(Color::Yellow),
        ))],
        AnalysisState::Ready(analysis) => analysis_lines(analysis),
        AnalysisState::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_text(app: &App, text: &str, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Your text ");

    if text.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(EMPTY_ROUND, italic().fg(Color::Gray)))
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
        return;
    }

    let inner = block.inner(area);
    let rows = wrap_lines(text, inner.width);
    let scroll = app.clamp_text_scroll(row_count(&rows).saturating_sub(inner.height));
    let block = if scroll > 0 || row_count(&rows) > inner.height {
        block.title_bottom(Line::from(format!(" {}/{} ", scroll + 1, rows.len())).right_aligned())
    } else {
        block
    };

    let lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
    f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

pub fn render(app: &App, f: &mut Frame) {
    let Some(end) = app.last_round() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // heading
            Constraint::Length(1), // score
            Constraint::Length(1), // summary
            Constraint::Length(1),
            Constraint::Min(3),    // text and analysis
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(content_area(f.area()));

    f.render_widget(
        Paragraph::new(Span::styled("Time's up!", bold())).alignment(Alignment::Center),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Final score ", dim()),
            Span::styled(format_score(end.score), accent()),
        ]))
        .alignment(Alignment::Center),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(summary_line(end)).alignment(Alignment::Center),
        chunks[2],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[4]);

    render_text(app, &end.text, f, body[0]);
    render_analysis(app, f, body[1]);

    if let Some(notice) = app.notice() {
        f.render_widget(
            Paragraph::new(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center),
            chunks[5],
        );
    }

    let legend = if end.text.is_empty() {
        "(p)lay again / (m)enu / (esc)ape"
    } else {
        "(a)nalyze / (c)opy / (t)xt / (d) md / (↑↓) scroll / (p)lay again / (m)enu / (esc)ape"
    };
    f.render_widget(Paragraph::new(Span::styled(legend, italic())), chunks[6]);
}
