//! TOML configuration with defaults for every key.

pub mod schema;

pub use schema::ToolbeltConfig;

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Config file name inside the home directory.
pub const CONFIG_FILE: &str = "toolbelt.toml";

/// Default toolbelt home directory (~/.toolbelt).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".toolbelt"))
        .unwrap_or_else(|| PathBuf::from(".toolbelt"))
}

/// Default config path (~/.toolbelt/toolbelt.toml).
pub fn default_config_path() -> PathBuf {
    default_home_dir().join(CONFIG_FILE)
}

/// Resolve a path that may contain `~` to an absolute path.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Read the config at `path`. A missing file means every key takes its
/// default; a file that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<ToolbeltConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ToolbeltConfig::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot read {}", path.display()));
        }
    };
    toml::from_str(&raw).with_context(|| format!("Invalid toolbelt config in {}", path.display()))
}

/// Write `config` as TOML, creating parent directories as needed.
pub fn save_config(config: &ToolbeltConfig, path: &Path) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Cannot encode toolbelt config")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    }
    std::fs::write(path, rendered).with_context(|| format!("Cannot write {}", path.display()))
}
