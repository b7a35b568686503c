#![allow(dead_code)]

use ironlog::{LogOptions, LogStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A store over its own temporary storage root.
pub struct TestEnv {
  pub store: LogStore,
  // Dropping the guard deletes the root, so it lives as long as the env.
  pub _dir: TempDir,
  pub root: PathBuf,
}

impl TestEnv {
  pub fn new(mut options: LogOptions) -> Self {
    let dir = tempfile::tempdir().unwrap();
    options.root_path = dir.path().to_path_buf();
    let root = options.root_path.clone();
    let store = LogStore::new(options).unwrap();
    Self { store, _dir: dir, root }
  }

  pub fn with_default() -> Self {
    Self::new(LogOptions::default())
  }

  pub fn stream_path(&self, stream: &str) -> PathBuf {
    file_in(&self.root, stream, ironlog::STREAM_SUFFIX)
  }

  pub fn archive_path(&self, archive: &str) -> PathBuf {
    file_in(&self.root, archive, ironlog::ARCHIVE_SUFFIX)
  }

  /// Reads a stream file straight from disk, bypassing the store.
  pub fn raw_stream(&self, stream: &str) -> String {
    std::fs::read_to_string(self.stream_path(stream)).unwrap()
  }

  /// Plants a stream file the store did not write, e.g. from another tool.
  pub fn write_raw_stream(&self, stream: &str, bytes: &[u8]) {
    std::fs::write(self.stream_path(stream), bytes).unwrap();
  }
}

fn file_in(root: &Path, id: &str, suffix: &str) -> PathBuf {
  root.join(format!("{}{}", id, suffix))
}
