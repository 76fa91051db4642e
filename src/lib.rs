//! Native shell around an embedded Excalidraw editor.
//!
//! The editor page runs in a webview owned by a host process; this crate
//! supplies everything around it: opening and saving drawings in the three
//! supported formats, exporting images, and the script round trips that fetch
//! the document out of the page. Callback-driven native APIs are bridged into
//! sequential `async` flows driven by the host event loop.

pub mod bridge;
pub mod config;
pub mod format;
pub mod host;
pub mod native;
pub mod protocol;
pub mod signals;
pub mod window;

pub use config::Config;
