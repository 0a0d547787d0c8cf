//! Application state types and core data structures.
//!
//! Defines the App struct which holds all mutable application state,
//! plus supporting types for focus, toasts, and pane hit-testing.

use std::sync::mpsc::Sender;
use std::time::Duration;

use ratatui::layout::Rect;

use crate::clipboard::CopyTarget;
use crate::config::Config;
use crate::editor::EditorBuffer;
use crate::events::AppEvent;
use crate::keymap::{parse_key_chord, KeyChord};
use crate::template::{render_template, OutputState};
use crate::theme::ThemeKind;

pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Default template shown on first launch (SmolLM's chat template).
pub const DEFAULT_TEMPLATE: &str = "{% for message in messages %}{% if loop.first and messages[0]['role'] != 'system' %}{{ '<|im_start|>system\nYou are a helpful AI assistant named SmolLM, trained by Hugging Face<|im_end|>\n' }}{% endif %}{{'<|im_start|>' + message['role'] + '\n' + message['content'] + '<|im_end|>' + '\n'}}{% endfor %}{% if add_generation_prompt %}{{ '<|im_start|>assistant\n' }}{% endif %}";

/// Default context object the template renders against.
pub fn default_context() -> String {
    serde_json::to_string_pretty(&serde_json::json!({
        "messages": [
            {"role": "user", "content": "Hello, how are you?"},
            {"role": "assistant", "content": "I'm doing great. How can I help you today?"},
            {"role": "user", "content": "Can you tell me a joke?"}
        ],
        "add_generation_prompt": true,
        "bos_token": "<|im_start|>",
        "eos_token": "<|im_end|>",
        "pad_token": "<|im_end|>"
    }))
    .unwrap_or_default()
}

/// Which part of the UI receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ModelId,
    Template,
    Context,
    Output,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::ModelId => Focus::Template,
            Focus::Template => Focus::Context,
            Focus::Context => Focus::Output,
            Focus::Output => Focus::ModelId,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::ModelId => Focus::Output,
            Focus::Template => Focus::ModelId,
            Focus::Context => Focus::Template,
            Focus::Output => Focus::Context,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// One transient notification; at most one is visible at a time.
#[derive(Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub body: String,
    pub seq: u64,
}

/// Pane rects recorded at render time for mouse hit-testing.
#[derive(Debug, Default)]
pub struct PaneAreas {
    pub header: Option<Rect>,
    pub template: Option<Rect>,
    pub context: Option<Rect>,
    pub output: Option<Rect>,
}

/// Parsed key chords for the configurable actions.
#[derive(Debug)]
pub struct Chords {
    pub format: Option<KeyChord>,
    pub load: Option<KeyChord>,
    pub copy: Option<KeyChord>,
    pub toggle_theme: Option<KeyChord>,
    pub quit: Option<KeyChord>,
}

/// Main application state container.
///
/// Holds all mutable state for the TUI application. Methods are
/// split across input.rs (event handling) and render.rs (UI drawing).
pub struct App {
    pub focus: Focus,
    pub template: EditorBuffer,
    pub context: EditorBuffer,
    pub output: OutputState,
    pub output_scroll: usize,
    pub last_rendered: Option<(u64, u64)>,
    pub model_id: String,
    pub loading: bool,
    pub copied: Option<(CopyTarget, u64)>,
    pub copy_seq: u64,
    pub toast: Option<Toast>,
    pub toast_seq: u64,
    pub theme: ThemeKind,
    pub config: Config,
    pub chords: Chords,
    pub should_quit: bool,
    pub event_tx: Sender<AppEvent>,
    pub areas: PaneAreas,
}

impl App {
    pub fn with_config(config: Config, theme: ThemeKind, event_tx: Sender<AppEvent>) -> Self {
        let chords = Chords {
            format: parse_key_chord(&config.keymap.format),
            load: parse_key_chord(&config.keymap.load),
            copy: parse_key_chord(&config.keymap.copy),
            toggle_theme: parse_key_chord(&config.keymap.toggle_theme),
            quit: parse_key_chord(&config.keymap.quit),
        };
        let mut app = Self {
            focus: Focus::Template,
            template: EditorBuffer::from_text(DEFAULT_TEMPLATE),
            context: EditorBuffer::from_text(&default_context()),
            output: OutputState::default(),
            output_scroll: 0,
            last_rendered: None,
            model_id: String::new(),
            loading: false,
            copied: None,
            copy_seq: 0,
            toast: None,
            toast_seq: 0,
            theme,
            config,
            chords,
            should_quit: false,
            event_tx,
            areas: PaneAreas::default(),
        };
        app.refresh_render();
        app
    }

    /// Re-run the render pipeline if either input buffer changed since the
    /// last run. Called after every drained event batch, so the pipeline
    /// always sees the latest snapshot of both inputs and runs at most
    /// once per batch.
    pub fn refresh_render(&mut self) {
        let revisions = (self.template.revision(), self.context.revision());
        if self.last_rendered == Some(revisions) {
            return;
        }
        let result = render_template(&self.template.text(), &self.context.text());
        self.output.apply(result);
        self.last_rendered = Some(revisions);
    }

    /// Show a toast and arm its expiry timer.
    pub fn show_toast(&mut self, kind: ToastKind, title: &str, body: String) {
        self.toast_seq += 1;
        let seq = self.toast_seq;
        self.toast = Some(Toast {
            kind,
            title: title.to_string(),
            body,
            seq,
        });
        spawn_toast_expiry(seq, self.event_tx.clone());
    }
}

fn spawn_toast_expiry(seq: u64, event_tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        std::thread::sleep(TOAST_DURATION);
        let _ = event_tx.send(AppEvent::ToastExpired { seq });
    });
}
