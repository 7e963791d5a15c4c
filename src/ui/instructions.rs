use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use wordflow::{
    flow::{DECAY_FACTOR, GROWTH_PER_EDIT, IDLE_THRESHOLD, MAX_MULTIPLIER},
    scoring::{LENGTH_BONUS_CAP, NEW_WORD_POINTS, REPEAT_WORD_POINTS},
};

use crate::ui::{accent, bold, centered_rect, dim, italic};

fn rules() -> Vec<Line<'static>> {
    let bullet = |text: String| Line::from(vec![Span::styled("• ", accent()), Span::raw(text)]);

    vec![
        Line::from(Span::styled("Write without stopping until the timer runs out.", bold())),
        Line::from(""),
        bullet(format!(
            "A word you haven't used yet earns {NEW_WORD_POINTS} points plus one per letter, up to {LENGTH_BONUS_CAP} extra."
        )),
        bullet(format!("Repeating a word earns {REPEAT_WORD_POINTS} point.")),
        bullet(format!(
            "Every keystroke adds {GROWTH_PER_EDIT:.2} to your flow multiplier, up to x{MAX_MULTIPLIER:.0}."
        )),
        bullet(format!(
            "Stop for more than {} seconds and the multiplier shrinks by {:.0}% every half second.",
            IDLE_THRESHOLD.as_secs(),
            (1.0 - DECAY_FACTOR) * 100.0
        )),
        bullet("Keyboard mashing doesn't score.".to_string()),
        bullet("Finish a round each day to keep your streak alive.".to_string()),
        bullet("When time's up, (c) copies your text and (t) or (d) saves it.".to_string()),
        Line::from(""),
        Line::from(Span::styled("(esc) close", italic().patch(dim()))),
    ]
}

pub fn render(f: &mut Frame) {
    let area = centered_rect(66, 18, f.area());

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(rules())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" How to play ", accent())),
            )
            .wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use crate::ui::test_support::{app, draw};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Instant;
    use wordflow::runtime::FlowEvent;

    #[test]
    fn test_instructions_overlay_welcome() {
        let (mut app, _dir) = app(None);
        app.handle(
            FlowEvent::Key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE)),
            Instant::now(),
        );

        let screen = draw(&app, 100, 30);
        assert!(screen.contains("How to play"));
        assert!(screen.contains("Repeating a word earns 1 point."));
        assert!(screen.contains("(esc) close"));
    }
}
