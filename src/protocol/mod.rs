//! Save-data protocol between the shell and the embedded editor.
//!
//! The webview can only evaluate scripts fire-and-forget, so a request is a
//! `getSaveData(args, nonce)` invocation and its answer arrives later as a
//! `{data, nonce}` message on the save-data channel. The nonce pairs the
//! answer with the task awaiting it.

mod gate;
mod nonce;
mod types;


use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

pub use gate::ScriptGate;
pub use nonce::{DEFAULT_NONCE_BOUND, PendingRequests};
pub use types::{ProtocolError, SaveDataArgs, SaveDataMessage, UnknownNoncePolicy};

use crate::bridge::promise;
use crate::format::{LoadPayload, SaveFormat};
use crate::native::WebContent;

pub struct SaveDataProtocol {
    gate: ScriptGate,
    pending: RefCell<PendingRequests<Value>>,
    policy: UnknownNoncePolicy,
}

impl SaveDataProtocol {
    pub fn new(content: Rc<dyn WebContent>, policy: UnknownNoncePolicy, nonce_bound: u64) -> Self {
        Self {
            gate: ScriptGate::new(content),
            pending: RefCell::new(PendingRequests::new(nonce_bound)),
            policy,
        }
    }

    pub fn gate(&self) -> &ScriptGate {
        &self.gate
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Asks the editor for its current document and waits for the answer.
    pub async fn request(&self, format: SaveFormat, export: bool) -> Result<Value, ProtocolError> {
        let args = serde_json::to_string(&SaveDataArgs { format, export })
            .map_err(ProtocolError::Script)?;
        if self.pending.borrow().is_full() {
            return Err(ProtocolError::NoncesExhausted(self.pending_requests()));
        }

        let data = promise(|resolver| {
            let nonce = self.pending.borrow_mut().insert(resolver);
            // Capacity was checked above and nothing runs in between.
            if let Some(nonce) = nonce {
                debug!("Requesting {} save data (export: {}, nonce {})", format, export, nonce);
                self.gate.run(format!("getSaveData({}, {});", args, nonce));
            }
        })
        .await?;

        debug!("Received {} save data", format);
        Ok(data)
    }

    /// Routes a message from the save-data channel to its awaiting request.
    pub fn handle_message(&self, message: &Value) -> Result<(), ProtocolError> {
        let message: SaveDataMessage =
            serde_json::from_value(message.clone()).map_err(ProtocolError::MalformedMessage)?;

        let resolver = self.pending.borrow_mut().take(message.nonce);
        match resolver {
            Some(resolver) => {
                resolver.resolve(message.data);
                Ok(())
            }
            None => match self.policy {
                UnknownNoncePolicy::Log => {
                    warn!("Dropping save data for unknown nonce {}", message.nonce);
                    Ok(())
                }
                UnknownNoncePolicy::Error => Err(ProtocolError::UnknownNonce(message.nonce)),
            },
        }
    }

    /// Hands a document to the editor's `loadSaveData`, once it is ready.
    pub fn load(&self, payload: &LoadPayload) -> Result<(), ProtocolError> {
        let args = serde_json::to_string(payload).map_err(ProtocolError::Script)?;
        debug!("Loading {} document into the editor", payload.format());
        self.gate.run(format!("loadSaveData({});", args));
        Ok(())
    }

    /// Called when the editor reports it finished initializing.
    pub fn content_initialized(&self) {
        let flushed = self.gate.open();
        debug!("Editor initialized, flushed {} queued invocations", flushed);
    }
}
