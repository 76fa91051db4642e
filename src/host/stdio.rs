//! Line-delimited JSON transport to an external webview process.
//!
//! The process owning the actual window and webview writes one [`HostInput`]
//! per line to our stdin and executes every [`HostOutput`] line we print.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::{HostLoop, IdleQueue};
use crate::config::{Action, KeyBinding};
use crate::native::{
    ChooserRequest, ContentEvents, DialogResponse, FileChooser, INITIALIZED_CHANNEL,
    SAVE_DATA_CHANNEL, SaveLocation, WebContent, WindowControl,
};
use crate::signals::Signal;

/// A line received from the webview process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostInput {
    /// A script message posted by the page on `channel`.
    Message {
        channel: String,
        #[serde(default)]
        body: Value,
    },
    /// Answer to the last `present_chooser`. Neither field means cancelled.
    Dialog {
        #[serde(default)]
        uri: Option<String>,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// A menu item was activated.
    Action { name: String },
    /// A key press the webview did not consume.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
    },
}

/// A line sent to the webview process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostOutput {
    /// Sent once at startup.
    Show {
        width: u32,
        height: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        accelerators: BTreeMap<&'static str, Vec<String>>,
    },
    RunScript {
        script: String,
    },
    PresentChooser {
        #[serde(flatten)]
        request: ChooserRequest,
    },
    SetFullscreen {
        fullscreen: bool,
    },
    ToggleFullscreen,
    Print,
    Close,
}

/// Host loop, webview, chooser and window backed by a pair of byte streams.
pub struct StdioHost<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
    idle: IdleQueue,
    events: ContentEvents,
    responses: Signal<DialogResponse>,
    keymap: HashMap<KeyBinding, Action>,
    actions: RefCell<VecDeque<Action>>,
    finished: Cell<bool>,
}

impl<R: BufRead, W: Write> StdioHost<R, W> {
    pub fn new(input: R, output: W, keymap: HashMap<KeyBinding, Action>) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
            idle: IdleQueue::new(),
            events: ContentEvents::default(),
            responses: Signal::new(),
            keymap,
            actions: RefCell::new(VecDeque::new()),
            finished: Cell::new(false),
        }
    }

    /// Queue that native completions are posted to.
    pub fn idle(&self) -> &IdleQueue {
        &self.idle
    }

    /// Whether the peer hung up or the window was closed.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    /// Actions requested since the last call, oldest first.
    pub fn take_actions(&self) -> Vec<Action> {
        self.actions.borrow_mut().drain(..).collect()
    }

    pub fn send(&self, message: &HostOutput) {
        let mut output = self.output.borrow_mut();
        let written = serde_json::to_writer(&mut *output, message)
            .map_err(std::io::Error::from)
            .and_then(|()| output.write_all(b"\n"))
            .and_then(|()| output.flush());
        if let Err(err) = written {
            error!("Failed to write to host: {}", err);
            self.finished.set(true);
        }
    }

    /// Reads and dispatches one input line. Returns `false` at end of input.
    fn read_line(&self) -> bool {
        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line);
        match read {
            Ok(0) => {
                debug!("Host closed its end of the transport");
                false
            }
            Ok(_) => {
                self.handle_line(line.trim());
                true
            }
            Err(err) => {
                error!("Failed to read from host: {}", err);
                false
            }
        }
    }

    pub fn handle_line(&self, line: &str) {
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<HostInput>(line) {
            Ok(input) => self.dispatch(input),
            Err(err) => warn!("Skipping malformed host line ({}): {}", err, line),
        }
    }

    fn dispatch(&self, input: HostInput) {
        match input {
            HostInput::Message { channel, body } => match channel.as_str() {
                SAVE_DATA_CHANNEL => self.events.save_data.emit(&body),
                INITIALIZED_CHANNEL => self.events.initialized.emit(&()),
                other => warn!("Message on unknown channel '{}'", other),
            },
            HostInput::Dialog { uri, path } => {
                let response = dialog_response(uri, path);
                debug!("Dialog response: {:?}", response);
                self.responses.emit(&response);
            }
            HostInput::Action { name } => match Action::from_name(&name) {
                Some(action) => self.actions.borrow_mut().push_back(action),
                None => warn!("Unknown action '{}'", name),
            },
            HostInput::Key {
                key,
                ctrl,
                shift,
                alt,
            } => {
                let action = self
                    .keymap
                    .iter()
                    .find(|(binding, _)| binding.matches(&key, ctrl, shift, alt))
                    .map(|(_, action)| *action);
                if let Some(action) = action {
                    self.actions.borrow_mut().push_back(action);
                }
            }
        }
    }
}

/// Turns a dialog line into a response. Unusable locations count as a cancel.
fn dialog_response(uri: Option<String>, path: Option<PathBuf>) -> DialogResponse {
    let location = match (uri, path) {
        (Some(uri), _) => SaveLocation::from_uri(&uri),
        (None, Some(path)) => SaveLocation::from_path(&path),
        (None, None) => return DialogResponse::Cancelled,
    };
    match location {
        Ok(location) => DialogResponse::Accepted(location),
        Err(err) => {
            warn!("Treating dialog answer as cancelled: {}", err);
            DialogResponse::Cancelled
        }
    }
}

impl<R: BufRead, W: Write> HostLoop for StdioHost<R, W> {
    fn iterate(&self) -> bool {
        if self.idle.dispatch_one() {
            return true;
        }
        if self.finished.get() {
            return false;
        }
        if !self.read_line() {
            self.finished.set(true);
            return false;
        }
        true
    }
}

impl<R: BufRead, W: Write> WebContent for StdioHost<R, W> {
    fn run_script(&self, script: &str) {
        self.send(&HostOutput::RunScript {
            script: script.to_string(),
        });
    }

    fn events(&self) -> &ContentEvents {
        &self.events
    }
}

impl<R: BufRead, W: Write> FileChooser for StdioHost<R, W> {
    fn present(&self, request: &ChooserRequest) {
        self.send(&HostOutput::PresentChooser {
            request: request.clone(),
        });
    }

    fn responses(&self) -> &Signal<DialogResponse> {
        &self.responses
    }
}

impl<R: BufRead, W: Write> WindowControl for StdioHost<R, W> {
    fn close(&self) {
        self.send(&HostOutput::Close);
        self.finished.set(true);
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.send(&HostOutput::SetFullscreen { fullscreen });
    }

    fn toggle_fullscreen(&self) {
        self.send(&HostOutput::ToggleFullscreen);
    }

    fn print(&self) {
        self.send(&HostOutput::Print);
    }
}
