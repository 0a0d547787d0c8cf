//! Reusable widget rendering functions.
//!
//! Pure functions that produce ratatui widgets from data.
//! No state mutation happens here.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::layout::bottom_right_rect;
use crate::theme::Theme;

/// Render a transient toast box in the bottom-right corner.
pub fn render_toast(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    body: &str,
    is_error: bool,
) {
    let accent = if is_error { theme.error } else { theme.success };
    let max_width = (area.width / 2).max(1);
    let desired = body.chars().count().max(title.chars().count()) as u16 + 4;
    let width = desired.clamp(24.min(max_width), max_width);
    let body_lines = wrapped_line_count(body, width.saturating_sub(2) as usize);
    let rect = bottom_right_rect(width, body_lines as u16 + 2, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    let paragraph = Paragraph::new(body.to_string())
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}

fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    text.lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum::<usize>()
        .max(1)
}
