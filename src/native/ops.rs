//! Callback-style file operations and their completion table.

use std::fmt;
use std::io;

use super::location::{FileIdentity, SaveLocation};

/// Handle to an open replacing output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// A native file operation. Each one finishes with exactly one [`FileReply`]
/// kind, declared in [`COMPLETIONS`].
pub enum FileOp {
    /// Open a stream whose contents replace the target when closed.
    Replace { location: SaveLocation },
    Write { stream: StreamId, bytes: Vec<u8> },
    /// Flush and commit a replacing stream.
    Close { stream: StreamId },
    /// Drop a replacing stream without touching the target.
    Discard { stream: StreamId },
    QueryIdentity { location: SaveLocation },
    LoadContents { location: SaveLocation },
    ReplaceContents { location: SaveLocation, bytes: Vec<u8> },
}

impl FileOp {
    pub fn name(&self) -> &'static str {
        match self {
            FileOp::Replace { .. } => "replace",
            FileOp::Write { .. } => "write",
            FileOp::Close { .. } => "close",
            FileOp::Discard { .. } => "discard",
            FileOp::QueryIdentity { .. } => "query_identity",
            FileOp::LoadContents { .. } => "load_contents",
            FileOp::ReplaceContents { .. } => "replace_contents",
        }
    }

    /// Human-readable target, for error messages.
    pub fn target(&self) -> String {
        match self {
            FileOp::Replace { location }
            | FileOp::QueryIdentity { location }
            | FileOp::LoadContents { location }
            | FileOp::ReplaceContents { location, .. } => location.to_string(),
            FileOp::Write { stream, .. }
            | FileOp::Close { stream }
            | FileOp::Discard { stream } => format!("stream {}", stream.0),
        }
    }
}

impl fmt::Debug for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOp::Write { stream, bytes } => f
                .debug_struct("Write")
                .field("stream", stream)
                .field("bytes", &bytes.len())
                .finish(),
            FileOp::ReplaceContents { location, bytes } => f
                .debug_struct("ReplaceContents")
                .field("location", location)
                .field("bytes", &bytes.len())
                .finish(),
            other => write!(f, "{}({})", other.name(), other.target()),
        }
    }
}

/// Successful completion of a [`FileOp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReply {
    Stream(StreamId),
    Written(usize),
    Closed,
    Discarded,
    Identity(FileIdentity),
    Contents(Vec<u8>),
    Replaced,
}

impl FileReply {
    pub fn name(&self) -> &'static str {
        match self {
            FileReply::Stream(_) => "stream",
            FileReply::Written(_) => "written",
            FileReply::Closed => "closed",
            FileReply::Discarded => "discarded",
            FileReply::Identity(_) => "identity",
            FileReply::Contents(_) => "contents",
            FileReply::Replaced => "replaced",
        }
    }
}

/// Operation name to the completion it must finish with.
pub static COMPLETIONS: [(&str, &str); 7] = [
    ("replace", "stream"),
    ("write", "written"),
    ("close", "closed"),
    ("discard", "discarded"),
    ("query_identity", "identity"),
    ("load_contents", "contents"),
    ("replace_contents", "replaced"),
];

pub fn completion_for(operation: &str) -> Option<&'static str> {
    COMPLETIONS
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, completion)| *completion)
}

/// Invoked once with the outcome of a [`FileOp`].
pub type FileCallback = Box<dyn FnOnce(io::Result<FileReply>)>;

/// Callback-driven native file API.
pub trait FileSystem {
    /// Starts `op`. `done` must be called exactly once, from a later host
    /// loop iteration rather than from inside `start`.
    fn start(&self, op: FileOp, done: FileCallback);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn every_op() -> Vec<FileOp> {
        let location = SaveLocation::from_path("/tmp/x").unwrap();
        let stream = StreamId(0);
        vec![
            FileOp::Replace {
                location: location.clone(),
            },
            FileOp::Write {
                stream,
                bytes: Vec::new(),
            },
            FileOp::Close { stream },
            FileOp::Discard { stream },
            FileOp::QueryIdentity {
                location: location.clone(),
            },
            FileOp::LoadContents {
                location: location.clone(),
            },
            FileOp::ReplaceContents {
                location,
                bytes: Vec::new(),
            },
        ]
    }

    #[test]
    fn every_operation_has_exactly_one_completion() {
        let ops = every_op();
        assert_eq!(ops.len(), COMPLETIONS.len());
        for op in &ops {
            let matches = COMPLETIONS.iter().filter(|(name, _)| *name == op.name()).count();
            assert_eq!(matches, 1, "{}", op.name());
        }
        let completions: HashSet<_> = COMPLETIONS.iter().map(|(_, c)| *c).collect();
        assert_eq!(completions.len(), COMPLETIONS.len());
    }

    #[test]
    fn unknown_operations_have_no_completion() {
        assert_eq!(completion_for("write"), Some("written"));
        assert_eq!(completion_for("truncate"), None);
    }
}
