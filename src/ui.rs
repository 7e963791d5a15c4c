pub mod instructions;
pub mod results;
pub mod screen;
pub mod welcome;
pub mod writing;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use wordflow::app::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub fn accent() -> Style {
    bold().fg(Color::Magenta)
}

/// Draw the current screen, then the how-to-play dialog on top if it is open
pub fn render(app: &App, f: &mut Frame) {
    screen::current_screen(app.state()).render(app, f);

    if app.show_instructions() {
        instructions::render(f);
    }
}

/// Word-wrap `text` into rows at most `width` columns wide.
///
/// Words longer than a row are broken across rows. Spaces at a row break
/// are dropped but the last row keeps its trailing spaces. Views render these rows as-is, so their scroll
/// math matches what ends up on screen.
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();

    for line in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;

        for word in line.split_inclusive(' ') {
            if row_width > 0 && row_width + word.trim_end_matches(' ').width() > width {
                rows.push(row.trim_end_matches(' ').to_string());
                row.clear();
                row_width = 0;
            }
            for c in word.chars() {
                let c = if c == '\t' { ' ' } else { c };
                let w = c.width().unwrap_or(0);
                if row_width + w > width {
                    if c == ' ' {
                        continue;
                    }
                    rows.push(row.trim_end_matches(' ').to_string());
                    row.clear();
                    row_width = 0;
                }
                row.push(c);
                row_width += w;
            }
        }
        rows.push(row);
    }
    rows
}

/// Number of rows as a scroll offset
pub fn row_count(rows: &[String]) -> u16 {
    u16::try_from(rows.len()).unwrap_or(u16::MAX)
}

/// A `width` x `height` rect centered in `area`, clamped to it
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Area inside the screen margins shared by all screens
pub fn content_area(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(1)])
        .split(area)[0]
}
