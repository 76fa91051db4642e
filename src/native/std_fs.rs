//! `std::fs` implementation of the callback file API.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::location::FileIdentity;
use super::ops::{FileCallback, FileOp, FileReply, FileSystem, StreamId};
use crate::bridge::IdleQueue;

/// Output stream writing to a sibling temporary file that replaces the
/// target on commit.
struct ReplaceStream {
    target: PathBuf,
    temp_path: PathBuf,
    file: Option<File>,
}

impl ReplaceStream {
    fn create(target: &Path) -> io::Result<Self> {
        let (temp_path, file) = create_temp_for(target)?;
        Ok(Self {
            target: target.to_path_buf(),
            temp_path,
            file: Some(file),
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(bytes),
            None => Err(io::Error::other("stream already closed")),
        }
    }

    fn commit(mut self) -> io::Result<()> {
        let Some(file) = self.file.take() else {
            return Err(io::Error::other("stream already closed"));
        };
        file.sync_all()?;
        drop(file);

        // Keep the permissions of the file being replaced.
        if let Ok(existing) = fs::metadata(&self.target) {
            fs::set_permissions(&self.temp_path, existing.permissions())?;
        }
        fs::rename(&self.temp_path, &self.target)?;
        self.temp_path.clear();
        Ok(())
    }
}

impl Drop for ReplaceStream {
    fn drop(&mut self) {
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        self.file.take();
        if let Err(err) = fs::remove_file(&self.temp_path) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove temporary file {}: {}",
                    self.temp_path.display(),
                    err
                );
            }
        }
    }
}

/// Creates a sibling temporary file for `target`. Every open stream gets its
/// own file, even when several replace the same target.
fn create_temp_for(target: &Path) -> io::Result<(PathBuf, File)> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".to_string());
    let base = format!(".{}.{}.tmp", name, std::process::id());
    let mut candidate = target.with_file_name(&base);
    let mut counter = 0u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                counter += 1;
                candidate = target.with_file_name(format!("{}{}", base, counter));
            }
            Err(err) => return Err(err),
        }
    }
}

/// Local file system whose completions are delivered through the host
/// loop's [`IdleQueue`].
pub struct StdFileSystem {
    idle: IdleQueue,
    streams: RefCell<HashMap<StreamId, ReplaceStream>>,
    next_stream: Cell<u64>,
}

impl StdFileSystem {
    pub fn new(idle: IdleQueue) -> Self {
        Self {
            idle,
            streams: RefCell::new(HashMap::new()),
            next_stream: Cell::new(0),
        }
    }

    pub fn open_streams(&self) -> usize {
        self.streams.borrow().len()
    }

    fn perform(&self, op: FileOp) -> io::Result<FileReply> {
        match op {
            FileOp::Replace { location } => {
                let stream = ReplaceStream::create(location.path())?;
                let id = StreamId(self.next_stream.get());
                self.next_stream.set(id.0 + 1);
                self.streams.borrow_mut().insert(id, stream);
                debug!("Opened replace stream {} for {}", id.0, location);
                Ok(FileReply::Stream(id))
            }
            FileOp::Write { stream, bytes } => {
                let mut streams = self.streams.borrow_mut();
                let target = streams.get_mut(&stream).ok_or_else(|| unknown(stream))?;
                target.write_all(&bytes)?;
                Ok(FileReply::Written(bytes.len()))
            }
            FileOp::Close { stream } => {
                let target = self
                    .streams
                    .borrow_mut()
                    .remove(&stream)
                    .ok_or_else(|| unknown(stream))?;
                let path = target.target.clone();
                target.commit()?;
                debug!("Committed {}", path.display());
                Ok(FileReply::Closed)
            }
            FileOp::Discard { stream } => {
                self.streams.borrow_mut().remove(&stream);
                Ok(FileReply::Discarded)
            }
            FileOp::QueryIdentity { location } => {
                Ok(FileReply::Identity(identity_of(location.path())?))
            }
            FileOp::LoadContents { location } => Ok(FileReply::Contents(fs::read(location.path())?)),
            FileOp::ReplaceContents { location, bytes } => {
                let mut stream = ReplaceStream::create(location.path())?;
                stream.write_all(&bytes)?;
                stream.commit()?;
                Ok(FileReply::Replaced)
            }
        }
    }
}

impl FileSystem for StdFileSystem {
    fn start(&self, op: FileOp, done: FileCallback) {
        let result = self.perform(op);
        self.idle.post(move || done(result));
    }
}

fn unknown(stream: StreamId) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no open stream {}", stream.0),
    )
}

fn identity_of(path: &Path) -> io::Result<FileIdentity> {
    match fs::metadata(path) {
        Ok(metadata) => identity_from_metadata(path, &metadata),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Ok(FileIdentity::Missing(std::path::absolute(path)?))
        }
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn identity_from_metadata(_path: &Path, metadata: &fs::Metadata) -> io::Result<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Ok(FileIdentity::Inode {
        device: metadata.dev(),
        inode: metadata.ino(),
    })
}

#[cfg(not(unix))]
fn identity_from_metadata(path: &Path, _metadata: &fs::Metadata) -> io::Result<FileIdentity> {
    Ok(FileIdentity::Canonical(path.canonicalize()?))
}
