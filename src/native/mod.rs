//! Native collaborators consumed by the shell core.
//!
//! The webview, file chooser and window are owned by the host toolkit; the
//! core only sees the narrow interfaces below. Each one can be mocked in
//! tests.

mod files;
mod location;
mod ops;
mod std_fs;

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::signals::Signal;

pub use files::{AsyncFiles, FileError};
pub use location::{FileIdentity, LocationError, SaveLocation};
pub use ops::{COMPLETIONS, FileCallback, FileOp, FileReply, FileSystem, StreamId, completion_for};
pub use std_fs::StdFileSystem;

/// Script message channel answering `getSaveData` calls.
pub const SAVE_DATA_CHANNEL: &str = "getSaveData";
/// Script message channel announcing that the editor finished loading.
pub const INITIALIZED_CHANNEL: &str = "initializedExcalidraw";

/// Signals raised by the embedded editor page.
#[derive(Debug, Default)]
pub struct ContentEvents {
    /// `{data, nonce}` messages posted on [`SAVE_DATA_CHANNEL`].
    pub save_data: Signal<Value>,
    /// The page posted on [`INITIALIZED_CHANNEL`].
    pub initialized: Signal<()>,
}

/// The webview hosting the editor.
pub trait WebContent {
    /// Evaluates `script` in the page without waiting for a result.
    fn run_script(&self, script: &str);

    fn events(&self) -> &ContentEvents;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChooserAction {
    Open,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFilter {
    pub name: String,
    pub pattern: String,
}

impl FileFilter {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Everything needed to present a file selection dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChooserRequest {
    pub action: ChooserAction,
    pub accept_label: String,
    pub filters: Vec<FileFilter>,
    /// Preselected file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_uri: Option<String>,
    /// Suggested name when nothing is preselected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_name: Option<String>,
    pub confirm_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    Accepted(SaveLocation),
    Cancelled,
}

/// Modal file selection dialog.
pub trait FileChooser {
    /// Shows the dialog. The user's answer is emitted once on
    /// [`FileChooser::responses`], after which the dialog is gone. Callers
    /// keep at most one request outstanding.
    fn present(&self, request: &ChooserRequest);

    fn responses(&self) -> &Signal<DialogResponse>;
}

/// Window chrome operations the actions need.
pub trait WindowControl {
    fn close(&self);
    fn set_fullscreen(&self, fullscreen: bool);
    fn toggle_fullscreen(&self);
    fn print(&self);
}

/// Bundle of native collaborators used by a shell window.
#[derive(Clone)]
pub struct ShellDependencies {
    pub content: Rc<dyn WebContent>,
    pub files: Rc<dyn FileSystem>,
    pub chooser: Rc<dyn FileChooser>,
    pub window: Rc<dyn WindowControl>,
}
