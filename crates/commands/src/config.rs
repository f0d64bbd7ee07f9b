use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::menu::DEFAULT_SLASH_MENU_LIMIT;
use crate::theme::Theme;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SCRIPTUM_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "scriptum.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub theme: Theme,
    pub slash_menu_limit: usize,
    /// Gap between the cursor's bottom edge and the slash menu.
    pub slash_menu_offset: f32,
    /// Distance the selection toolbar floats above the selection.
    pub toolbar_offset: f32,
    pub document_title: String,
    pub workspace_name: String,
    pub footer_hint: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            slash_menu_limit: DEFAULT_SLASH_MENU_LIMIT,
            slash_menu_offset: 8.0,
            toolbar_offset: 50.0,
            document_title: "Untitled Document".to_string(),
            workspace_name: "My Documents".to_string(),
            footer_hint: "Type '/' for commands".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// `$SCRIPTUM_CONFIG` if set, else `./scriptum.json` if it exists, else
    /// defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            tracing::info!(path = %path.display(), "loading config");
            return Self::load(&path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::info!(path = %local.display(), "loading config");
            return Self::load(local);
        }
        Ok(Self::default())
    }
}
