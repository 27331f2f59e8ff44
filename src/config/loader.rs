use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$FLOW_BOARD_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/flow-board/config.toml`
/// 4. `~/.config/flow-board/config.toml`
///
/// A missing config file is not an error — defaults apply. A file that
/// exists but fails to parse is.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    // If an explicit path was given, just load that.
    if let Some(path) = explicit_path {
        return load_file(path);
    }

    match find_config() {
        Some(path) => load_file(&path),
        None => Ok(AppConfig::default()),
    }
}

fn load_file(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn find_config() -> Option<PathBuf> {
    // $FLOW_BOARD_CONFIG
    if let Ok(path) = std::env::var("FLOW_BOARD_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/flow-board/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("flow-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/flow-board/config.toml
    if let Some(home) = dirs_fallback() {
        let p = home.join(".config/flow-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn dirs_fallback() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
