//! Configuration type definitions.

use crate::protocol::{DEFAULT_NONCE_BOUND, UnknownNoncePolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Window geometry and behavior at startup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WindowConfig {
    /// Initial window width in pixels (valid range: 200 - 16384)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Initial window height in pixels (valid range: 200 - 16384)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Start fullscreen
    #[serde(default)]
    pub fullscreen: bool,

    /// Close the window after the first successful direct save
    #[serde(default)]
    pub close_on_save: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fullscreen: false,
            close_on_save: false,
        }
    }
}

/// Embedded editor settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContentConfig {
    /// Directory holding the bundled editor page. Relative paths are resolved
    /// against the config directory; unset means the host's built-in bundle.
    #[serde(default)]
    pub resource_dir: Option<PathBuf>,

    /// Page loaded from `resource_dir`
    #[serde(default = "default_index")]
    pub index: String,

    /// What to do with save data carrying a nonce nobody waits for
    /// ("log" drops it with a warning, "error" surfaces it)
    #[serde(default)]
    pub unknown_nonce: UnknownNoncePolicy,

    /// Maximum number of save-data requests awaiting an answer
    /// (valid range: 1 - 2^53)
    #[serde(default = "default_nonce_bound")]
    pub nonce_bound: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            resource_dir: None,
            index: default_index(),
            unknown_nonce: UnknownNoncePolicy::default(),
            nonce_bound: default_nonce_bound(),
        }
    }
}

/// File dialog defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DialogsConfig {
    /// Suggested name for a document that has never been saved
    #[serde(default = "default_untitled_name")]
    pub untitled_name: String,

    /// Export file stem used when the document name has none
    #[serde(default = "default_export_fallback_stem")]
    pub export_fallback_stem: String,
}

impl Default for DialogsConfig {
    fn default() -> Self {
        Self {
            untitled_name: default_untitled_name(),
            export_fallback_stem: default_export_fallback_stem(),
        }
    }
}

pub(super) fn default_width() -> u32 {
    1280
}

pub(super) fn default_height() -> u32 {
    800
}

fn default_index() -> String {
    "index.html".to_string()
}

pub(super) fn default_nonce_bound() -> u64 {
    DEFAULT_NONCE_BOUND
}

pub(super) fn default_untitled_name() -> String {
    "Untitled.excalidraw.svg".to_string()
}

pub(super) fn default_export_fallback_stem() -> String {
    "output".to_string()
}
