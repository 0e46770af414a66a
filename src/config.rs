//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprview/config.json`.
//! Every section and every field is optional; a missing file, or a minimal
//! `{}`, yields the compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "overview": {
//!     "scale": 0.1,
//!     "workspace_count": 10,
//!     "workspaces_per_row": 5,
//!     "icon_factor": 0.5
//!   },
//!   "window": { "namespace": "hyprview", "start_visible": false },
//!   "control_socket": "/run/user/1000/hyprview.sock"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Layout of the overview.
    #[serde(default)]
    pub overview: OverviewConfig,

    /// Overlay window settings.
    #[serde(default)]
    pub window: WindowConfig,

    /// Path of the control socket.  Defaults to
    /// `$XDG_RUNTIME_DIR/hyprview.sock`.
    #[serde(default)]
    pub control_socket: Option<PathBuf>,
}

/// Layout parameters of the overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    /// Factor applied to window sizes and positions.
    pub scale: f64,
    /// Number of numbered workspaces shown, starting at 1.
    pub workspace_count: i32,
    /// Workspaces per row.
    pub workspaces_per_row: i32,
    /// Icon edge as a fraction of the smaller window dimension.
    pub icon_factor: f64,
    /// Text shown in empty workspaces.
    pub placeholder: String,
    /// Spacing between rows and between workspaces (px).
    pub spacing: i32,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            scale: 0.1,
            workspace_count: 10,
            workspaces_per_row: 5,
            icon_factor: 0.5,
            placeholder: "+".into(),
            spacing: 8,
        }
    }
}

/// Overlay window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Layer-shell namespace.
    pub namespace: String,
    /// Stylesheet path.  Defaults to `style.css` in the config directory.
    pub css: Option<PathBuf>,
    /// Show the overview immediately on start.
    pub start_visible: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            namespace: "hyprview".into(),
            css: None,
            start_visible: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
