//! UI rendering methods.
//!
//! Handles all drawing/rendering for the TUI:
//! - Header (title, model id input, loading indicator)
//! - Editor panes (template, context) and the output pane
//! - Hint bar and toast overlay

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::clipboard::CopyTarget;
use crate::editor::EditorBuffer;
use crate::theme::Theme;
use crate::ui::{layout, widgets};

use super::state::{App, Focus, ToastKind};

const BOTTOM_HORIZONTAL_PADDING: u16 = 1;
const HEADER_TITLE: &str = " jinjapad ";
const MODEL_LABEL: &str = " model: ";

/// Main render entry point. Called each frame by the event loop.
pub fn render(app: &mut App, frame: &mut ratatui::Frame) {
    let theme = app.theme.palette();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        area,
    );

    // Vertical layout: header | panes | hint bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, rows[0], theme);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    let editors = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main[0]);

    app.areas.template = Some(editors[0]);
    app.areas.context = Some(editors[1]);
    app.areas.output = Some(main[1]);

    let template_focused = app.focus == Focus::Template;
    let context_focused = app.focus == Focus::Context;
    let template_copied = copied_for(app, CopyTarget::Template);
    let context_copied = copied_for(app, CopyTarget::Context);
    render_editor_pane(
        frame,
        editors[0],
        theme,
        "Jinja Template",
        &mut app.template,
        template_focused,
        template_copied,
    );
    render_editor_pane(
        frame,
        editors[1],
        theme,
        "JSON Context",
        &mut app.context,
        context_focused,
        context_copied,
    );
    render_output_pane(app, frame, main[1], theme);
    render_hint_bar(app, frame, rows[2], theme);

    if let Some(toast) = &app.toast {
        widgets::render_toast(
            frame,
            area,
            theme,
            &toast.title,
            &toast.body,
            toast.kind == ToastKind::Error,
        );
    }
}

fn copied_for(app: &App, target: CopyTarget) -> bool {
    app.copied.map(|(copied, _)| copied) == Some(target)
}

fn render_header(app: &mut App, frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    app.areas.header = Some(area);
    let mut spans = vec![
        Span::styled(
            HEADER_TITLE,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(MODEL_LABEL, Style::default().fg(theme.muted)),
    ];
    if app.model_id.is_empty() && app.focus != Focus::ModelId {
        spans.push(Span::styled(
            "<model id>",
            Style::default().fg(theme.muted).add_modifier(Modifier::DIM),
        ));
    } else {
        spans.push(Span::styled(
            app.model_id.clone(),
            Style::default().fg(theme.fg),
        ));
    }
    if app.loading {
        spans.push(Span::styled(
            "  fetching model config...",
            Style::default().fg(theme.accent),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    if app.focus == Focus::ModelId {
        let x = (HEADER_TITLE.len() + MODEL_LABEL.len() + app.model_id.chars().count()) as u16;
        if x < area.width {
            frame.set_cursor_position(Position::new(area.x + x, area.y));
        }
    }
}

fn render_editor_pane(
    frame: &mut ratatui::Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    editor: &mut EditorBuffer,
    focused: bool,
    copied: bool,
) {
    let border = if focused {
        theme.border_focused
    } else {
        theme.border_normal
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme.title),
        ));
    if copied {
        block = block.title_top(
            Line::from(Span::styled(
                " copied ",
                Style::default().fg(theme.success),
            ))
            .right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = inner.width as usize;
    let height = inner.height as usize;
    let (row_off, col_off) = if focused {
        editor.ensure_visible(width, height)
    } else {
        editor.offsets()
    };
    let mut lines = Vec::with_capacity(height);
    for row in row_off..row_off + height {
        lines.push(Line::raw(editor.visible_line(row, col_off, width).to_string()));
    }
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.fg)),
        inner,
    );

    if focused {
        let (cursor_row, cursor_col) = editor.cursor();
        if cursor_row >= row_off && cursor_col >= col_off {
            let y = (cursor_row - row_off) as u16;
            let x = (cursor_col - col_off) as u16;
            if y < inner.height && x < inner.width {
                frame.set_cursor_position(Position::new(inner.x + x, inner.y + y));
            }
        }
    }
}

fn render_output_pane(app: &mut App, frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Output;
    let border = if focused {
        theme.border_focused
    } else {
        theme.border_normal
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            " Rendered Output ",
            Style::default().fg(theme.title),
        ));
    if !app.output.is_current() {
        block = block.title_top(
            Line::from(Span::styled(
                " render error ",
                Style::default()
                    .fg(theme.error)
                    .add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    } else if copied_for(app, CopyTarget::Output) {
        block = block.title_top(
            Line::from(Span::styled(
                " copied ",
                Style::default().fg(theme.success),
            ))
            .right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if let Some(error) = app.output.error() {
        frame.render_widget(
            Paragraph::new(error.to_string())
                .style(Style::default().fg(theme.error))
                .wrap(Wrap { trim: false }),
            inner,
        );
        return;
    }

    let text = app.output.text();
    let total = text.lines().count();
    let height = inner.height as usize;
    app.output_scroll = app.output_scroll.min(total.saturating_sub(height));
    let lines: Vec<Line> = text
        .lines()
        .skip(app.output_scroll)
        .take(height)
        .map(|line| Line::raw(line.to_string()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.fg)),
        inner,
    );
}

fn render_hint_bar(app: &App, frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    let keymap = &app.config.keymap;
    let hints = format!(
        "tab focus · {} format · {} load · {} copy · {} theme · {} quit",
        keymap.format, keymap.load, keymap.copy, keymap.toggle_theme, keymap.quit
    );
    let bar = Paragraph::new(Line::raw(hints)).style(Style::default().fg(theme.muted));
    frame.render_widget(bar, layout::inset_horizontal(area, BOTTOM_HORIZONTAL_PADDING));
}
