//! Configuration file support for excalidraw-shell.
//!
//! Settings are read from `~/.config/excalidraw-shell/config.toml`. A missing
//! file means defaults; out-of-range values are clamped or reset with a
//! warning.

pub mod keybindings;
pub mod types;

pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{ContentConfig, DialogsConfig, WindowConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::window::WindowOptions;

/// Largest nonce still exactly representable as a JavaScript number.
const MAX_NONCE_BOUND: u64 = 1 << 53;
const WINDOW_SIZE_RANGE: std::ops::RangeInclusive<u32> = 200..=16384;

/// Root configuration structure.
///
/// # Example TOML
/// ```toml
/// [window]
/// width = 1600
/// height = 900
/// close_on_save = true
///
/// [content]
/// unknown_nonce = "error"
///
/// [dialogs]
/// untitled_name = "Sketch.excalidraw"
///
/// [keybindings]
/// export = ["Ctrl+Shift+E"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub dialogs: DialogsConfig,

    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    fn validate_and_clamp(&mut self) {
        if !WINDOW_SIZE_RANGE.contains(&self.window.width) {
            warn!(
                "Invalid window width {}, clamping to {}-{} range",
                self.window.width,
                WINDOW_SIZE_RANGE.start(),
                WINDOW_SIZE_RANGE.end()
            );
            self.window.width = self
                .window
                .width
                .clamp(*WINDOW_SIZE_RANGE.start(), *WINDOW_SIZE_RANGE.end());
        }

        if !WINDOW_SIZE_RANGE.contains(&self.window.height) {
            warn!(
                "Invalid window height {}, clamping to {}-{} range",
                self.window.height,
                WINDOW_SIZE_RANGE.start(),
                WINDOW_SIZE_RANGE.end()
            );
            self.window.height = self
                .window
                .height
                .clamp(*WINDOW_SIZE_RANGE.start(), *WINDOW_SIZE_RANGE.end());
        }

        if !(1..=MAX_NONCE_BOUND).contains(&self.content.nonce_bound) {
            warn!(
                "Invalid nonce_bound {}, clamping to 1-{} range",
                self.content.nonce_bound, MAX_NONCE_BOUND
            );
            self.content.nonce_bound = self.content.nonce_bound.clamp(1, MAX_NONCE_BOUND);
        }

        if self.content.index.trim().is_empty() {
            warn!("Empty content index, falling back to 'index.html'");
            self.content.index = "index.html".to_string();
        }

        if self.dialogs.untitled_name.trim().is_empty() {
            let fallback = types::default_untitled_name();
            warn!("Empty untitled_name, falling back to '{}'", fallback);
            self.dialogs.untitled_name = fallback;
        }

        let stem = &self.dialogs.export_fallback_stem;
        if stem.trim().is_empty() || stem.contains('/') {
            let fallback = types::default_export_fallback_stem();
            warn!(
                "Invalid export_fallback_stem '{}', falling back to '{}'",
                stem, fallback
            );
            self.dialogs.export_fallback_stem = fallback;
        }

        if let Err(err) = self.keybindings.build_action_map() {
            warn!("Invalid keybindings ({}), using defaults", err);
            self.keybindings = KeybindingsConfig::default();
        }
    }

    /// Returns the default config file location.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("excalidraw-shell");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads the config from the default location, or defaults if there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads and validates the config at `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();
        config.resolve_paths(config_path);

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Makes a relative `resource_dir` relative to the config file's directory.
    fn resolve_paths(&mut self, config_path: &Path) {
        let Some(dir) = self.content.resource_dir.as_ref() else {
            return;
        };
        if dir.is_relative() {
            if let Some(base) = config_path.parent() {
                self.content.resource_dir = Some(base.join(dir));
            }
        }
    }

    /// JSON schema of the config file, for editors and external tools.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            close_on_save: self.window.close_on_save,
            fullscreen: self.window.fullscreen,
            untitled_name: self.dialogs.untitled_name.clone(),
            export_fallback_stem: self.dialogs.export_fallback_stem.clone(),
            unknown_nonce: self.content.unknown_nonce,
            nonce_bound: self.content.nonce_bound,
        }
    }
}
