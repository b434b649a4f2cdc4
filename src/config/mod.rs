//! Configuration management for wpreader.
//!
//! Configuration is read from `~/.config/wpreader/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;
pub mod site;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;
pub use site::SiteConfig;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Load configuration from the default path, creating it on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load and validate a specific file. Missing fields use defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.site.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// `~/.config/wpreader/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("wpreader").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# wpreader configuration
#
# Colors can be named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB" / "#RGB").
#
# Keys can be single characters ("j", "R", "/"), special keys (Enter, Esc,
# Backspace, PageUp, PageDown, Up, Down, Space, F1-F12) or combinations
# such as "Ctrl+c".

[site]
# WordPress site to read. Posts come from <base_url>/wp-json/wp/v2/posts
base_url = "https://savebucks.us/"

# Posts per request (WordPress allows 1-100)
per_page = 20

# Request timeout in seconds. Leave unset to use the client default.
# timeout_secs = 10

[colors]
border = "Cyan"
selection_bg = "Cyan"
selection_fg = "Black"
post_title = "White"
post_excerpt = "Gray"
metadata_date = "Yellow"
metadata_link = "Blue"
metadata_image = "Magenta"
error = "LightRed"
search = "LightYellow"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["PageDown"]
prev_page = ["PageUp"]
select = ["Enter"]
back = ["Esc", "Backspace", "h"]
refresh = ["R"]
load_more = ["n"]
retry = ["r"]
search = ["/"]
open_in_browser = ["o"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
