//! Persisted UI state.
//!
//! Remembers the theme choice across runs in
//! `~/.config/jinjapad/state.toml`. The `JINJAPAD_STATE_PATH` environment
//! variable overrides the location (used by tests).

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::theme::ThemeKind;

#[derive(Debug, Deserialize)]
struct RawState {
    theme: Option<String>,
}

fn state_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("JINJAPAD_STATE_PATH") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("jinjapad").join("state.toml"))
}

pub fn load_theme() -> Option<ThemeKind> {
    let path = state_path()?;
    let contents = fs::read_to_string(path).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    let raw: RawState = toml::from_str(&contents).ok()?;
    ThemeKind::parse(raw.theme.as_deref()?)
}

pub fn save_theme(theme: ThemeKind) -> std::io::Result<()> {
    let path = match state_path() {
        Some(path) => path,
        None => return Ok(()),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("theme = \"{}\"\n", theme.as_str()))
}

#[cfg(test)]
mod tests {
    use super::{load_theme, save_theme};
    use crate::theme::ThemeKind;
    use std::env;
    use std::path::Path;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    static STATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_state_path<T>(path: &Path, action: impl FnOnce() -> T) -> T {
        let _guard = STATE_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
        let key = "JINJAPAD_STATE_PATH";
        let previous = env::var(key).ok();
        env::set_var(key, path);
        let result = action();
        match previous {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
        result
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state.toml");
        with_state_path(&path, || {
            save_theme(ThemeKind::Light).expect("save");
            assert_eq!(load_theme(), Some(ThemeKind::Light));
            save_theme(ThemeKind::Dark).expect("save");
            assert_eq!(load_theme(), Some(ThemeKind::Dark));
        });
    }

    #[test]
    fn missing_or_invalid_state_loads_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state.toml");
        with_state_path(&path, || {
            assert_eq!(load_theme(), None);
            std::fs::write(&path, "theme = \"plasma\"\n").expect("write");
            assert_eq!(load_theme(), None);
        });
    }
}
