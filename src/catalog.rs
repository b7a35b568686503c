use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::util;

/// A file in the storage root, classified by its naming convention.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogFile {
  /// An active, append-only stream file.
  Stream(String),
  /// An immutable compressed snapshot.
  Archive(String),
}

impl LogFile {
  /// Classifies a file name. Returns `None` for anything that is neither a
  /// stream nor an archive (temporaries, foreign files, invalid ids).
  pub fn from_filename(filename: &str) -> Option<Self> {
    if let Some(id) = util::parse_archive_id(filename) {
      return Some(LogFile::Archive(id.to_string()));
    }
    util::parse_stream_id(filename).map(|id| LogFile::Stream(id.to_string()))
  }

  pub fn id(&self) -> &str {
    match self {
      LogFile::Stream(id) | LogFile::Archive(id) => id,
    }
  }

  pub fn is_archive(&self) -> bool {
    matches!(self, LogFile::Archive(_))
  }

  pub fn filename(&self) -> String {
    match self {
      LogFile::Stream(id) => util::stream_filename(id),
      LogFile::Archive(id) => util::archive_filename(id),
    }
  }

  pub fn path_in(&self, root: &Path) -> PathBuf {
    root.join(self.filename())
  }
}

impl fmt::Display for LogFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogFile::Stream(id) => write!(f, "stream '{}'", id),
      LogFile::Archive(id) => write!(f, "archive '{}'", id),
    }
  }
}

/// Enumerates the storage root once and classifies every regular file.
/// The result is sorted (streams first, then archives, each by id).
pub(crate) fn scan(root: &Path) -> Result<Vec<LogFile>> {
  let mut files = Vec::new();
  for entry in fs::read_dir(root)? {
    let entry = entry?;
    if !entry.file_type()?.is_file() {
      continue;
    }
    let name = entry.file_name();
    // Non UTF-8 names cannot have been produced from a valid id.
    let Some(name) = name.to_str() else {
      continue;
    };
    if let Some(file) = LogFile::from_filename(name) {
      files.push(file);
    }
  }
  files.sort_unstable();
  Ok(files)
}

/// Collects ids from a scan. Archives are only included on request.
pub(crate) fn list_ids(root: &Path, include_archives: bool) -> Result<BTreeSet<String>> {
  let ids = scan(root)?
    .into_iter()
    .filter(|f| include_archives || !f.is_archive())
    .map(|f| match f {
      LogFile::Stream(id) | LogFile::Archive(id) => id,
    })
    .collect();
  Ok(ids)
}
