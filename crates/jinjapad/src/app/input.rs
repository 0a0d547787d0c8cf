//! Input event handling.
//!
//! Handles keyboard and mouse events, routing them to the focused pane,
//! and folds worker results (fetch, timers) back into app state.

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use crate::clipboard::{self, CopyTarget};
use crate::editor::EditorBuffer;
use crate::events::AppEvent;
use crate::hub::{self, FetchedTemplate, HubError};
use crate::keymap::matches_chord;
use crate::template::format::format_template;

use super::state::{App, Focus, ToastKind};

const PAGE_ROWS: usize = 10;
const SCROLL_LINES: isize = 3;

/// Main event dispatcher.
pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Input(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::FetchDone { model_id, result } => handle_fetch_done(app, &model_id, result),
        AppEvent::CopyExpired { seq } => {
            if app.copied.map(|(_, copied_seq)| copied_seq) == Some(seq) {
                app.copied = None;
            }
        }
        AppEvent::ToastExpired { seq } => {
            if app.toast.as_ref().map(|toast| toast.seq) == Some(seq) {
                app.toast = None;
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if let Some(chord) = &app.chords.quit {
        if matches_chord(&key, chord) {
            app.should_quit = true;
            return;
        }
    }
    if let Some(chord) = &app.chords.format {
        if matches_chord(&key, chord) {
            format_action(app);
            return;
        }
    }
    if let Some(chord) = &app.chords.load {
        if matches_chord(&key, chord) {
            load_action(app);
            return;
        }
    }
    if let Some(chord) = &app.chords.copy {
        if matches_chord(&key, chord) {
            copy_action(app);
            return;
        }
    }
    if let Some(chord) = &app.chords.toggle_theme {
        if matches_chord(&key, chord) {
            theme_action(app);
            return;
        }
    }

    match key.code {
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::ModelId => handle_model_id_key(app, key),
        Focus::Template => {
            editor_key(&mut app.template, key);
        }
        Focus::Context => {
            editor_key(&mut app.context, key);
        }
        Focus::Output => handle_output_key(app, key),
    }
}

fn handle_model_id_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => load_action(app),
        KeyCode::Backspace => {
            app.model_id.pop();
        }
        KeyCode::Char(ch) if !has_command_mods(key.modifiers) => {
            app.model_id.push(ch);
        }
        _ => {}
    }
}

fn handle_output_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.output_scroll = app.output_scroll.saturating_sub(1),
        KeyCode::Down => app.output_scroll = app.output_scroll.saturating_add(1),
        KeyCode::PageUp => app.output_scroll = app.output_scroll.saturating_sub(PAGE_ROWS),
        KeyCode::PageDown => app.output_scroll = app.output_scroll.saturating_add(PAGE_ROWS),
        KeyCode::Home => app.output_scroll = 0,
        _ => {}
    }
}

fn editor_key(editor: &mut EditorBuffer, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch) if !has_command_mods(key.modifiers) => editor.insert_char(ch),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete_forward(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        KeyCode::PageUp => editor.page_up(PAGE_ROWS),
        KeyCode::PageDown => editor.page_down(PAGE_ROWS),
        _ => {}
    }
}

fn has_command_mods(modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL)
        || modifiers.contains(KeyModifiers::ALT)
        || modifiers.contains(KeyModifiers::SUPER)
}

fn handle_paste(app: &mut App, text: &str) {
    match app.focus {
        Focus::ModelId => {
            app.model_id
                .extend(text.chars().filter(|ch| !ch.is_control()));
        }
        Focus::Template => app.template.insert_str(text),
        Focus::Context => app.context.insert_str(text),
        Focus::Output => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(focus) = focus_at(app, position) {
                app.focus = focus;
            }
        }
        MouseEventKind::ScrollUp => scroll_at(app, position, -SCROLL_LINES),
        MouseEventKind::ScrollDown => scroll_at(app, position, SCROLL_LINES),
        _ => {}
    }
}

fn focus_at(app: &App, position: Position) -> Option<Focus> {
    let hit = |area: Option<Rect>| area.is_some_and(|area| area.contains(position));
    if hit(app.areas.header) {
        Some(Focus::ModelId)
    } else if hit(app.areas.template) {
        Some(Focus::Template)
    } else if hit(app.areas.context) {
        Some(Focus::Context)
    } else if hit(app.areas.output) {
        Some(Focus::Output)
    } else {
        None
    }
}

fn scroll_at(app: &mut App, position: Position, delta: isize) {
    match focus_at(app, position) {
        Some(Focus::Template) => app.template.scroll_by(delta),
        Some(Focus::Context) => app.context.scroll_by(delta),
        Some(Focus::Output) => {
            app.output_scroll = app.output_scroll.saturating_add_signed(delta);
        }
        _ => {}
    }
}

/// Format the template in place; failure leaves the text untouched.
fn format_action(app: &mut App) {
    match format_template(&app.template.text()) {
        Ok(formatted) => {
            app.template.set_text(&formatted);
            app.show_toast(
                ToastKind::Success,
                "Template formatted",
                "Template has been formatted successfully".to_string(),
            );
        }
        Err(err) => {
            app.show_toast(ToastKind::Error, "Error formatting template", err.to_string());
        }
    }
}

/// Kick off a hub fetch for the entered model id.
fn load_action(app: &mut App) {
    let model_id = app.model_id.trim().to_string();
    if model_id.is_empty() {
        app.show_toast(
            ToastKind::Error,
            "Error",
            "Please enter a model ID".to_string(),
        );
        return;
    }
    app.loading = true;
    hub::spawn_fetch(
        app.config.hub.endpoint.clone(),
        model_id,
        app.event_tx.clone(),
    );
}

fn handle_fetch_done(
    app: &mut App,
    model_id: &str,
    result: Result<FetchedTemplate, HubError>,
) {
    app.loading = false;
    match result {
        Ok(fetched) => {
            app.template.set_text(&fetched.chat_template);
            match hub::merge_context(&app.context.text(), &fetched.defaults) {
                Ok(merged) => app.context.set_text(&merged),
                // The template replacement stands; a bad context only
                // loses the merge.
                Err(err) => {
                    tracing::warn!(error = %err, "skipping context merge");
                }
            }
            app.show_toast(
                ToastKind::Success,
                "Template loaded",
                format!("Successfully loaded template from {model_id}"),
            );
        }
        Err(err) => {
            app.show_toast(ToastKind::Error, "Error fetching model config", err.to_string());
        }
    }
}

/// Copy the focused pane to the clipboard and light its indicator.
fn copy_action(app: &mut App) {
    let (target, text) = match app.focus {
        Focus::Template => (CopyTarget::Template, app.template.text()),
        Focus::Context => (CopyTarget::Context, app.context.text()),
        Focus::Output => {
            if !app.output.is_current() {
                return;
            }
            (CopyTarget::Output, app.output.text().to_string())
        }
        Focus::ModelId => return,
    };
    match clipboard::copy_text(&text) {
        Ok(()) => {
            app.copy_seq += 1;
            app.copied = Some((target, app.copy_seq));
            clipboard::spawn_copy_expiry(app.copy_seq, app.event_tx.clone());
        }
        Err(err) => {
            tracing::debug!(error = %err, "clipboard copy failed");
        }
    }
}

fn theme_action(app: &mut App) {
    app.theme = app.theme.toggled();
    if let Err(err) = crate::state::save_theme(app.theme) {
        tracing::warn!(error = %err, "failed to persist theme");
    }
}

#[cfg(test)]
mod tests {
    use super::handle_event;
    use crate::app::state::{App, Focus, ToastKind};
    use crate::clipboard::CopyTarget;
    use crate::config::{Config, HubConfig, KeymapConfig};
    use crate::events::AppEvent;
    use crate::hub::{FetchedTemplate, HubError};
    use crate::theme::ThemeKind;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc::{self, Receiver};

    fn test_config() -> Config {
        Config {
            hub: HubConfig {
                endpoint: "https://hub.invalid".to_string(),
            },
            theme: "dark".to_string(),
            keymap: KeymapConfig {
                format: "ctrl+f".to_string(),
                load: "ctrl+l".to_string(),
                copy: "ctrl+y".to_string(),
                toggle_theme: "ctrl+t".to_string(),
                quit: "ctrl+q".to_string(),
            },
        }
    }

    fn test_app() -> (App, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let app = App::with_config(test_config(), ThemeKind::Dark, tx);
        (app, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Input(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ch: char) -> AppEvent {
        AppEvent::Input(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    #[test]
    fn fetch_done_replaces_template_and_merges_context() {
        let (mut app, _rx) = test_app();
        app.context.set_text(r#"{"messages": [], "keep": true}"#);
        app.refresh_render();

        let fetched = FetchedTemplate {
            chat_template: "{{ greeting }}".to_string(),
            defaults: vec![("greeting".to_string(), "hi".to_string())],
        };
        handle_event(
            &mut app,
            AppEvent::FetchDone {
                model_id: "org/model".to_string(),
                result: Ok(fetched),
            },
        );

        assert!(!app.loading);
        assert_eq!(app.template.text(), "{{ greeting }}");
        let context: serde_json::Value =
            serde_json::from_str(&app.context.text()).expect("context json");
        assert_eq!(context["greeting"], "hi");
        assert_eq!(context["keep"], true, "pre-existing keys are preserved");
        let toast = app.toast.as_ref().expect("toast");
        assert_eq!(toast.kind, ToastKind::Success);

        app.refresh_render();
        assert!(app.output.is_current());
        assert_eq!(app.output.text(), "hi");
    }

    #[test]
    fn fetch_done_error_leaves_state_untouched() {
        let (mut app, _rx) = test_app();
        app.loading = true;
        let template_before = app.template.text();
        let context_before = app.context.text();

        handle_event(
            &mut app,
            AppEvent::FetchDone {
                model_id: "org/model".to_string(),
                result: Err(HubError::MissingTemplate),
            },
        );

        assert!(!app.loading);
        assert_eq!(app.template.text(), template_before);
        assert_eq!(app.context.text(), context_before);
        let toast = app.toast.as_ref().expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.body.contains("no chat template found"));
    }

    #[test]
    fn fetch_done_merge_failure_still_replaces_template() {
        let (mut app, _rx) = test_app();
        app.context.set_text("{not valid json");

        handle_event(
            &mut app,
            AppEvent::FetchDone {
                model_id: "org/model".to_string(),
                result: Ok(FetchedTemplate {
                    chat_template: "{{ greeting }}".to_string(),
                    defaults: vec![("greeting".to_string(), "hi".to_string())],
                }),
            },
        );

        assert_eq!(app.template.text(), "{{ greeting }}");
        assert_eq!(app.context.text(), "{not valid json");
        assert_eq!(app.toast.as_ref().expect("toast").kind, ToastKind::Success);
    }

    #[test]
    fn empty_model_id_shows_error_without_loading() {
        let (mut app, _rx) = test_app();
        app.model_id = "   ".to_string();
        handle_event(&mut app, ctrl('l'));

        assert!(!app.loading);
        let toast = app.toast.as_ref().expect("toast");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.body.contains("model ID"));
    }

    #[test]
    fn copy_expiry_ignores_stale_sequence_numbers() {
        let (mut app, _rx) = test_app();
        app.copy_seq = 5;
        app.copied = Some((CopyTarget::Template, 5));

        handle_event(&mut app, AppEvent::CopyExpired { seq: 4 });
        assert!(app.copied.is_some(), "stale expiry must not clear");

        handle_event(&mut app, AppEvent::CopyExpired { seq: 5 });
        assert!(app.copied.is_none());
    }

    #[test]
    fn toast_expiry_clears_only_the_matching_toast() {
        let (mut app, _rx) = test_app();
        app.show_toast(ToastKind::Success, "first", "one".to_string());
        app.show_toast(ToastKind::Success, "second", "two".to_string());
        let stale_seq = app.toast_seq - 1;

        handle_event(&mut app, AppEvent::ToastExpired { seq: stale_seq });
        assert!(app.toast.is_some());

        let current_seq = app.toast_seq;
        handle_event(&mut app, AppEvent::ToastExpired { seq: current_seq });
        assert!(app.toast.is_none());
    }

    #[test]
    fn tab_cycles_focus_through_all_panes() {
        let (mut app, _rx) = test_app();
        app.focus = Focus::ModelId;
        let mut seen = vec![app.focus];
        for _ in 0..3 {
            handle_event(&mut app, key(KeyCode::Tab));
            seen.push(app.focus);
        }
        assert_eq!(
            seen,
            vec![Focus::ModelId, Focus::Template, Focus::Context, Focus::Output]
        );
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::ModelId);
    }

    #[test]
    fn typing_in_context_rerenders_and_bad_json_keeps_old_output() {
        let (mut app, _rx) = test_app();
        app.template.set_text("{{ a }}");
        app.context.set_text(r#"{"a": "x"}"#);
        app.refresh_render();
        assert_eq!(app.output.text(), "x");

        app.focus = Focus::Context;
        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Char('{')));
        app.refresh_render();

        assert!(!app.output.is_current());
        assert_eq!(app.output.text(), "x", "stale output is retained");
    }

    #[test]
    fn format_error_leaves_template_unchanged() {
        let (mut app, _rx) = test_app();
        app.template.set_text("{% for %}");
        handle_event(&mut app, ctrl('f'));

        assert_eq!(app.template.text(), "{% for %}");
        assert_eq!(app.toast.as_ref().expect("toast").kind, ToastKind::Error);
    }

    #[test]
    fn format_success_replaces_template_with_equivalent() {
        let (mut app, _rx) = test_app();
        app.template.set_text("{% if x %}hello{% endif %}");
        app.context.set_text(r#"{"x": true}"#);
        app.refresh_render();
        let before = app.output.text().to_string();

        handle_event(&mut app, ctrl('f'));
        assert_ne!(app.template.text(), "{% if x %}hello{% endif %}");
        assert_eq!(app.toast.as_ref().expect("toast").kind, ToastKind::Success);

        app.refresh_render();
        assert_eq!(app.output.text(), before, "formatting must not change output");
    }

    #[test]
    fn quit_chord_sets_should_quit() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, ctrl('q'));
        assert!(app.should_quit);
    }
}
