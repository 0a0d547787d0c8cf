//! Configuration loading and merging.
//!
//! Config is loaded from two sources with the project taking precedence:
//! 1. User-level: `~/.jinjapad/config.toml`
//! 2. Project-level: `<cwd>/.jinjapad/config.toml`
//!
//! Supports keymap customization, the hub endpoint, and the default
//! theme. Uses TOML format with serde.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::hub::DEFAULT_ENDPOINT;

const DEFAULT_FORMAT: &str = "ctrl+f";
const DEFAULT_LOAD: &str = "ctrl+l";
const DEFAULT_COPY: &str = "ctrl+y";
const DEFAULT_TOGGLE_THEME: &str = "ctrl+t";
const DEFAULT_QUIT: &str = "ctrl+q";
const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone)]
pub struct Config {
    pub hub: HubConfig,
    pub theme: String,
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct KeymapConfig {
    pub format: String,
    pub load: String,
    pub copy: String,
    pub toggle_theme: String,
    pub quit: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    hub: Option<RawHub>,
    theme: Option<String>,
    keymap: Option<RawKeymap>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHub {
    endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKeymap {
    format: Option<String>,
    load: Option<String>,
    copy: Option<String>,
    #[serde(alias = "toggleTheme")]
    toggle_theme: Option<String>,
    quit: Option<String>,
}

fn read_toml(path: &Path) -> Option<RawConfig> {
    let contents = fs::read_to_string(path).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    toml::from_str::<RawConfig>(&contents).ok()
}

fn merge_config(user: Option<RawConfig>, project: Option<RawConfig>) -> Config {
    let project_keymap = project.as_ref().and_then(|c| c.keymap.as_ref());
    let user_keymap = user.as_ref().and_then(|c| c.keymap.as_ref());
    let format = project_keymap
        .and_then(|k| k.format.clone())
        .or_else(|| user_keymap.and_then(|k| k.format.clone()))
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    let load = project_keymap
        .and_then(|k| k.load.clone())
        .or_else(|| user_keymap.and_then(|k| k.load.clone()))
        .unwrap_or_else(|| DEFAULT_LOAD.to_string());
    let copy = project_keymap
        .and_then(|k| k.copy.clone())
        .or_else(|| user_keymap.and_then(|k| k.copy.clone()))
        .unwrap_or_else(|| DEFAULT_COPY.to_string());
    let toggle_theme = project_keymap
        .and_then(|k| k.toggle_theme.clone())
        .or_else(|| user_keymap.and_then(|k| k.toggle_theme.clone()))
        .unwrap_or_else(|| DEFAULT_TOGGLE_THEME.to_string());
    let quit = project_keymap
        .and_then(|k| k.quit.clone())
        .or_else(|| user_keymap.and_then(|k| k.quit.clone()))
        .unwrap_or_else(|| DEFAULT_QUIT.to_string());

    let endpoint = project
        .as_ref()
        .and_then(|c| c.hub.as_ref())
        .and_then(|h| h.endpoint.clone())
        .or_else(|| {
            user.as_ref()
                .and_then(|c| c.hub.as_ref())
                .and_then(|h| h.endpoint.clone())
        })
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let theme = project
        .as_ref()
        .and_then(|c| c.theme.clone())
        .or_else(|| user.as_ref().and_then(|c| c.theme.clone()))
        .unwrap_or_else(|| DEFAULT_THEME.to_string());

    Config {
        hub: HubConfig { endpoint },
        theme,
        keymap: KeymapConfig {
            format,
            load,
            copy,
            toggle_theme,
            quit,
        },
    }
}

fn config_path_from_root(root: &Path) -> PathBuf {
    root.join(".jinjapad").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(config_path_from_root(&home))
}

pub fn load_config(root: &Path) -> Config {
    let project_path = config_path_from_root(root);
    let user_path = user_config_path();

    let project_config = read_toml(&project_path);
    let user_config = user_path.and_then(|path| read_toml(&path));

    merge_config(user_config, project_config)
}
