use thiserror::Error;

use crate::bridge::BridgeError;
use crate::format::CodecError;
use crate::native::{FileError, SaveLocation};
use crate::protocol::{DEFAULT_NONCE_BOUND, ProtocolError, UnknownNoncePolicy};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("No save location is set")]
    NoSaveLocation,
}

/// Where the window's save target stands.
///
/// The last export target is tracked separately, see
/// [`super::ShellWindow::export_target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    NoLocation,
    HasLocation(SaveLocation),
    Saving(SaveLocation),
}

/// Startup options for a [`super::ShellWindow`].
#[derive(Debug, Clone)]
pub struct WindowOptions {
    /// Close the window after the next direct save succeeds.
    pub close_on_save: bool,
    pub fullscreen: bool,
    /// Suggested file name when nothing has been saved yet.
    pub untitled_name: String,
    /// Export name used when the save location has no usable stem.
    pub export_fallback_stem: String,
    pub unknown_nonce: UnknownNoncePolicy,
    pub nonce_bound: u64,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            close_on_save: false,
            fullscreen: false,
            untitled_name: "Untitled.excalidraw.svg".to_string(),
            export_fallback_stem: "output".to_string(),
            unknown_nonce: UnknownNoncePolicy::default(),
            nonce_bound: DEFAULT_NONCE_BOUND,
        }
    }
}
