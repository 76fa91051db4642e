use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::format::SaveFormat;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URI scheme '{0}' (only file:// is supported)")]
    UnsupportedScheme(String),

    #[error("URI '{0}' does not name a local file")]
    NotLocal(String),

    #[error("Cannot resolve path '{path}': {source}")]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reference to the file a drawing is saved to or exported to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveLocation {
    path: PathBuf,
}

impl SaveLocation {
    /// Wraps a path, resolving it against the working directory if relative.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LocationError> {
        let path = path.as_ref();
        let path = std::path::absolute(path).map_err(|source| LocationError::Unresolvable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn from_uri(uri: &str) -> Result<Self, LocationError> {
        let url = Url::parse(uri).map_err(|source| LocationError::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;
        if url.scheme() != "file" {
            return Err(LocationError::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|_| LocationError::NotLocal(uri.to_string()))?;
        Ok(Self { path })
    }

    /// Accepts either a `file://` URI or a plain path, as given on a command line.
    pub fn from_commandline_arg(arg: &str) -> Result<Self, LocationError> {
        if arg.contains("://") {
            Self::from_uri(arg)
        } else {
            Self::from_path(arg)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uri(&self) -> String {
        Url::from_file_path(&self.path)
            .map(String::from)
            .unwrap_or_else(|()| format!("file://{}", self.path.display()))
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Format implied by the location's name.
    pub fn format(&self) -> SaveFormat {
        SaveFormat::from_name(&self.uri())
    }
}

impl fmt::Display for SaveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// On-disk identity of a location, used to tell whether two locations name
/// the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity {
    /// Device and inode of an existing file.
    Inode { device: u64, inode: u64 },
    /// Canonical path of an existing file where inodes are unavailable.
    Canonical(PathBuf),
    /// The file does not exist yet.
    Missing(PathBuf),
}
