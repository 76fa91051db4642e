//! Wire types and errors of the save-data protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::bridge::BridgeError;
use crate::format::SaveFormat;

/// What to do with a response whose nonce matches no pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UnknownNoncePolicy {
    /// Log a warning and drop the response.
    #[default]
    Log,
    /// Report the response as a protocol error to the message handler.
    Error,
}

/// First argument of the editor's `getSaveData(args, nonce)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveDataArgs {
    pub format: SaveFormat,
    /// Export mode: the editor may leave out data that only matters for
    /// further editing.
    pub export: bool,
}

/// Body posted by the editor on the save-data channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaveDataMessage {
    pub data: Value,
    pub nonce: u64,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Received save data for unknown nonce {0}")]
    UnknownNonce(u64),

    #[error("Malformed save data message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    #[error("Failed to build editor invocation: {0}")]
    Script(#[source] serde_json::Error),

    #[error("Too many save data requests in flight ({0})")]
    NoncesExhausted(usize),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
