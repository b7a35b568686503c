use std::io;
use thiserror::Error;

use crate::catalog::LogFile;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O Error: {0}")]
  Io(#[from] io::Error),

  #[error("Not found: {0}")]
  NotFound(LogFile),

  #[error("Archive already exists: {0}")]
  AlreadyExists(String),

  #[error("Archive corrupted: {0}")]
  Corruption(String),

  #[error("Invalid log id: {0}")]
  InvalidId(String),

  #[error("Invalid entry: {0}")]
  InvalidEntry(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  /// The archive is in place but a later step failed (directory sync or
  /// stream reset). The stream may still hold the archived entries.
  #[error("Archive '{archive}' was written but rotation did not complete: {source}")]
  Incomplete { archive: String, source: io::Error },
}

impl Error {
  /// Whether repeating the same call may succeed.
  ///
  /// Only storage-layer failures that left no archive behind qualify.
  /// A rotation that failed with `AlreadyExists` or `Incomplete` must be
  /// retried under a new archive id instead.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Error::Io(_))
  }

  /// Reclassifies a storage failure that happened after `archive` became
  /// visible, so callers do not repeat the rotation under the same id.
  pub(crate) fn after_archive(self, archive: &str) -> Self {
    match self {
      Error::Io(source) => Error::Incomplete {
        archive: archive.to_string(),
        source,
      },
      other => other,
    }
  }

  /// Maps an `io::ErrorKind::NotFound` onto the typed variant for `file`.
  pub(crate) fn from_io(e: io::Error, file: LogFile) -> Self {
    if e.kind() == io::ErrorKind::NotFound {
      Error::NotFound(file)
    } else {
      Error::Io(e)
    }
  }
}
