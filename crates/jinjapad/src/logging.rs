//! Tracing setup.
//!
//! The terminal owns stdout, so logs go to
//! `~/.local/state/jinjapad/jinjapad.log`. Filter via `JINJAPAD_LOG`
//! (standard env-filter syntax), defaulting to `info`. Setup failures are
//! ignored; the app works without a log file.

use std::fs::{self, File};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub fn init() {
    let Some(dir) = dirs::home_dir().map(|home| home.join(".local/state/jinjapad")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("jinjapad.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env("JINJAPAD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
