use std::path::PathBuf;

use crate::error::{Error, Result};

/// Defines how often writes are flushed to the physical disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
  /// Call `fsync` after every append and every truncation.
  /// Safest, but highest latency.
  Strict,

  /// Never call `fsync` on stream files. Relies on the OS background
  /// flush mechanism. Archives are always synced before they become visible.
  Async,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
  /// Directory holding every stream and archive file.
  /// Must exist before the store is opened; it is never created here.
  pub root_path: PathBuf,

  /// Durability of stream appends and resets.
  /// Default: `SyncMode::Strict`.
  pub sync_mode: SyncMode,

  /// Gzip level used when rotating a stream into an archive (0-9).
  /// Default: 6.
  pub compression_level: u32,
}

impl Default for LogOptions {
  fn default() -> Self {
    Self {
      root_path: PathBuf::from("./.logs"),
      sync_mode: SyncMode::Strict,
      compression_level: 6,
    }
  }
}

impl LogOptions {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      root_path: path.into(),
      ..Default::default()
    }
  }

  pub(crate) fn validate(&self) -> Result<()> {
    if self.compression_level > 9 {
      return Err(Error::Config(format!(
        "compression_level must be in 0..=9, got {}",
        self.compression_level
      )));
    }
    if !self.root_path.is_dir() {
      return Err(Error::Config(format!(
        "Storage root {} does not exist or is not a directory",
        self.root_path.display()
      )));
    }
    Ok(())
  }
}
