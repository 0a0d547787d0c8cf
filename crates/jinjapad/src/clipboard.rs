//! Clipboard copy with transient feedback.
//!
//! Copies pane text via the system clipboard and drives the 2-second
//! "copied" indicator through a timer thread. Expiry events carry a
//! sequence number so a stale timer never clears a newer indicator.

use std::sync::mpsc::Sender;
use std::time::Duration;

use arboard::Clipboard;

use crate::events::AppEvent;

pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

/// Which pane a copy came from; selects the indicator to light up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Template,
    Context,
    Output,
}

pub fn copy_text(text: &str) -> Result<(), arboard::Error> {
    Clipboard::new()?.set_text(text.to_string())
}

pub fn spawn_copy_expiry(seq: u64, event_tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        std::thread::sleep(COPY_FEEDBACK_WINDOW);
        let _ = event_tx.send(AppEvent::CopyExpired { seq });
    });
}
