use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use wordflow::{
    app::App,
    config::DURATION_OPTIONS_MINS,
    util::{format_time, pluralize_days},
};

use crate::ui::{accent, bold, content_area, dim, italic};

fn duration_picker(app: &App) -> Line<'static> {
    let selected = app.config().duration_option();
    let overridden = app.round_duration() != app.config().duration_secs;

    let mut spans = Vec::with_capacity(DURATION_OPTIONS_MINS.len() * 2);
    for (i, mins) in DURATION_OPTIONS_MINS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let label = format!("{mins}m");
        if !overridden && selected == Some(i) {
            spans.push(Span::styled(
                format!("[{label}]"),
                accent().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(format!(" {label} "), dim()));
        }
    }
    Line::from(spans)
}

pub fn render(app: &App, f: &mut Frame) {
    let area = content_area(f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // top padding
            Constraint::Length(1), // title
            Constraint::Length(1), // tagline
            Constraint::Length(1),
            Constraint::Length(1), // streak
            Constraint::Length(1),
            Constraint::Length(1), // duration label
            Constraint::Length(1), // duration picker
            Constraint::Min(0),    // bottom padding
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled("wordflow", accent())).alignment(Alignment::Center),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            "Keep writing. Fresh words score big, pauses cost you.",
            italic(),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        chunks[2],
    );

    let streak = app.streak();
    let streak_style = if streak > 0 {
        bold().fg(Color::Yellow)
    } else {
        dim()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Streak: ", bold()),
            Span::styled(pluralize_days(streak), streak_style),
        ]))
        .alignment(Alignment::Center),
        chunks[4],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            format!("Round length: {}", format_time(app.round_duration())),
            bold(),
        ))
        .alignment(Alignment::Center),
        chunks[6],
    );
    f.render_widget(
        Paragraph::new(duration_picker(app)).alignment(Alignment::Center),
        chunks[7],
    );

    if let Some(notice) = app.notice() {
        f.render_widget(
            Paragraph::new(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Red),
            ))
            .alignment(Alignment::Center),
            chunks[9],
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "(enter) start / (←/→) length / (?) how to play / (esc)ape",
            italic(),
        )),
        chunks[10],
    );
}

#[cfg(test)]
mod tests {
    use crate::ui::test_support::{app, draw};

    #[test]
    fn test_welcome_shows_streak_and_selected_length() {
        let (app, _dir) = app(None);
        let screen = draw(&app, 100, 20);

        assert!(screen.contains("wordflow"));
        assert!(screen.contains("Streak: 0 Days"));
        assert!(screen.contains("Round length: 5:00"));
        assert!(screen.contains("[5m]"));
        assert!(screen.contains("(enter) start"));
    }

    #[test]
    fn test_welcome_with_cli_length_marks_no_preset() {
        let (app, _dir) = app(Some(90));
        let screen = draw(&app, 100, 20);

        assert!(screen.contains("Round length: 1:30"));
        assert!(!screen.contains("[5m]"));
    }
}
