use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::catalog::LogFile;
use crate::config::{LogOptions, SyncMode};
use crate::error::{Error, Result};

/// Rejects entries that would break the one-entry-per-line layout.
pub(crate) fn check_entry(entry: &str) -> Result<()> {
  if entry.contains(['\n', '\r']) {
    return Err(Error::InvalidEntry(format!(
      "entry contains a line terminator: {:?}",
      entry
    )));
  }
  Ok(())
}

/// Appends `entries` as newline-terminated lines to a stream file, creating it
/// if absent. All lines go out in a single write so a reader never sees a
/// partial entry once this returns.
pub(crate) fn append_lines<S: AsRef<str>>(root: &Path, stream: &str, entries: &[S], options: &LogOptions) -> Result<()> {
  let mut buf = String::with_capacity(entries.iter().map(|e| e.as_ref().len() + 1).sum());
  for entry in entries {
    let entry = entry.as_ref();
    check_entry(entry)?;
    buf.push_str(entry);
    buf.push('\n');
  }
  if buf.is_empty() {
    return Ok(());
  }

  let path = LogFile::Stream(stream.to_string()).path_in(root);
  let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
  file.write_all(buf.as_bytes())?;

  if options.sync_mode == SyncMode::Strict {
    file.sync_data()?;
  }
  Ok(())
}

/// Resets a stream file to zero length in place. The file must exist.
pub(crate) fn truncate(root: &Path, stream: &str, options: &LogOptions) -> Result<()> {
  let target = LogFile::Stream(stream.to_string());
  let file = OpenOptions::new()
    .write(true)
    .open(target.path_in(root))
    .map_err(|e| Error::from_io(e, target))?;

  file.set_len(0)?;

  if options.sync_mode == SyncMode::Strict {
    file.sync_all()?;
  }
  Ok(())
}

/// Reads the full text of a stream file.
pub(crate) fn read(root: &Path, stream: &str) -> Result<String> {
  let target = LogFile::Stream(stream.to_string());
  fs::read_to_string(target.path_in(root)).map_err(|e| Error::from_io(e, target))
}
