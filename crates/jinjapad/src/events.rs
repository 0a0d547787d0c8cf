//! Application event types.
//!
//! Defines the event enum used for communication between the input
//! thread, fetch workers, timer threads, and the main event loop.
//!
//! Events are sent via mpsc channels and processed sequentially
//! in the main loop to update app state and trigger re-renders.

use crossterm::event::{KeyEvent, MouseEvent};

use crate::hub::{FetchedTemplate, HubError};

#[derive(Debug)]
pub enum AppEvent {
    Input(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Resize,
    FetchDone {
        model_id: String,
        result: Result<FetchedTemplate, HubError>,
    },
    CopyExpired {
        seq: u64,
    },
    ToastExpired {
        seq: u64,
    },
}
