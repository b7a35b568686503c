use crate::error::{Error, Result};
use std::path::Path;

/// Suffix of an active stream file.
pub const STREAM_SUFFIX: &str = ".log";

/// Suffix of an archive file (base64 text of a gzip stream).
pub const ARCHIVE_SUFFIX: &str = ".gz.b64";

/// Checks that an id is safe to use as a file stem in the storage root.
///
/// Ids are rejected rather than rewritten: a listing must hand back exactly
/// the id the caller wrote with. A leading `.` is reserved for temporaries.
pub fn validate_id(id: &str) -> Result<()> {
  if id.is_empty() {
    return Err(Error::InvalidId("id cannot be empty".into()));
  }
  if id.starts_with('.') {
    return Err(Error::InvalidId(format!("id cannot start with '.': {}", id)));
  }
  if let Some(c) = id
    .chars()
    .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.'))
  {
    return Err(Error::InvalidId(format!("id contains {:?}: {}", c, id)));
  }
  Ok(())
}

/// Format: `<id>.log`
pub fn stream_filename(id: &str) -> String {
  format!("{}{}", id, STREAM_SUFFIX)
}

/// Format: `<id>.gz.b64`
pub fn archive_filename(id: &str) -> String {
  format!("{}{}", id, ARCHIVE_SUFFIX)
}

/// Parses a stream id from a file name. Hidden names are never ids.
pub fn parse_stream_id(filename: &str) -> Option<&str> {
  strip_visible(filename, STREAM_SUFFIX)
}

/// Parses an archive id from a file name. Hidden names are never ids.
pub fn parse_archive_id(filename: &str) -> Option<&str> {
  strip_visible(filename, ARCHIVE_SUFFIX)
}

/// Only stems that are valid ids count; anything else (temporaries,
/// hand-made files like `my log.log`) is invisible to the store.
fn strip_visible<'a>(filename: &'a str, suffix: &str) -> Option<&'a str> {
  let id = filename.strip_suffix(suffix)?;
  validate_id(id).ok()?;
  Some(id)
}

/// fsync a directory so a rename or link inside it is persisted.
pub fn sync_dir(dir: &Path) -> std::io::Result<()> {
  // Directories cannot be opened as files on Windows.
  #[cfg(unix)]
  {
    std::fs::File::open(dir)?.sync_all()?;
  }
  #[cfg(not(unix))]
  let _ = dir;
  Ok(())
}
