use std::io;
use std::rc::Rc;

use log::trace;
use thiserror::Error;

use super::location::{FileIdentity, SaveLocation};
use super::ops::{FileOp, FileReply, FileSystem, StreamId, completion_for};
use crate::bridge::{BridgeError, promise};

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to {operation} {target}: {source}")]
    Io {
        operation: &'static str,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Awaitable facade over a callback-driven [`FileSystem`].
#[derive(Clone)]
pub struct AsyncFiles {
    fs: Rc<dyn FileSystem>,
}

impl AsyncFiles {
    pub fn new(fs: Rc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Starts `op`, suspends until its callback fires, and checks the reply
    /// against the completion table.
    pub async fn call(&self, op: FileOp) -> Result<FileReply, FileError> {
        let operation = op.name();
        let expected = completion_for(operation).ok_or(BridgeError::NoCompletion(operation))?;
        let target = op.target();
        trace!("Starting {:?}", op);

        let fs = self.fs.clone();
        let outcome = promise(move |resolver| {
            fs.start(op, Box::new(move |result| resolver.resolve(result)))
        })
        .await?;

        let reply = outcome.map_err(|source| FileError::Io {
            operation,
            target,
            source,
        })?;
        if reply.name() != expected {
            return Err(mismatch(operation, &reply));
        }
        Ok(reply)
    }

    pub async fn replace(&self, location: &SaveLocation) -> Result<StreamId, FileError> {
        let op = FileOp::Replace {
            location: location.clone(),
        };
        match self.call(op).await? {
            FileReply::Stream(stream) => Ok(stream),
            other => Err(mismatch("replace", &other)),
        }
    }

    pub async fn write(&self, stream: StreamId, bytes: Vec<u8>) -> Result<usize, FileError> {
        match self.call(FileOp::Write { stream, bytes }).await? {
            FileReply::Written(count) => Ok(count),
            other => Err(mismatch("write", &other)),
        }
    }

    pub async fn close(&self, stream: StreamId) -> Result<(), FileError> {
        self.call(FileOp::Close { stream }).await.map(|_| ())
    }

    pub async fn discard(&self, stream: StreamId) -> Result<(), FileError> {
        self.call(FileOp::Discard { stream }).await.map(|_| ())
    }

    pub async fn query_identity(&self, location: &SaveLocation) -> Result<FileIdentity, FileError> {
        let op = FileOp::QueryIdentity {
            location: location.clone(),
        };
        match self.call(op).await? {
            FileReply::Identity(identity) => Ok(identity),
            other => Err(mismatch("query_identity", &other)),
        }
    }

    pub async fn load_contents(&self, location: &SaveLocation) -> Result<Vec<u8>, FileError> {
        let op = FileOp::LoadContents {
            location: location.clone(),
        };
        match self.call(op).await? {
            FileReply::Contents(bytes) => Ok(bytes),
            other => Err(mismatch("load_contents", &other)),
        }
    }

    pub async fn replace_contents(
        &self,
        location: &SaveLocation,
        bytes: Vec<u8>,
    ) -> Result<(), FileError> {
        let op = FileOp::ReplaceContents {
            location: location.clone(),
            bytes,
        };
        self.call(op).await.map(|_| ())
    }
}

fn mismatch(operation: &'static str, reply: &FileReply) -> FileError {
    FileError::Bridge(BridgeError::UnexpectedCompletion {
        operation,
        expected: completion_for(operation).unwrap_or("none"),
        received: reply.name(),
    })
}
