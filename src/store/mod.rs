mod stream_locks;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::archive;
use crate::catalog::{self, LogFile};
use crate::config::LogOptions;
use crate::error::{Error, Result};
use crate::store::stream_locks::StreamLocks;
use crate::stream;
use crate::util;

/// Upper bound on fresh ids tried by `rotate_all` for one stream.
const MAX_ARCHIVE_ID_ATTEMPTS: u32 = 16;

/// Outcome of `LogStore::rotate_all`, one entry per stream.
#[derive(Debug, Default)]
pub struct RotationReport {
  /// `(stream, archive)` pairs that were archived and reset.
  pub rotated: Vec<(String, String)>,
  /// Streams left alone because they were empty.
  pub skipped: Vec<String>,
  /// Streams whose rotation failed. An `Error::Incomplete` here means the
  /// named archive exists but the stream was not reset.
  pub failed: Vec<(String, Error)>,
}

impl RotationReport {
  pub fn is_complete(&self) -> bool {
    self.failed.is_empty()
  }
}

struct StoreState {
  options: LogOptions,
  locks: StreamLocks,
}

/// The main entry point for the ironlog library.
/// Thread-safe and cloneable; clones share per-stream locking.
#[derive(Clone)]
pub struct LogStore {
  inner: Arc<StoreState>,
}

impl LogStore {
  /// Opens a store over an existing storage root.
  pub fn new(options: LogOptions) -> Result<Self> {
    options.validate()?;
    Ok(Self {
      inner: Arc::new(StoreState {
        options,
        locks: StreamLocks::default(),
      }),
    })
  }

  pub fn root(&self) -> &Path {
    &self.inner.options.root_path
  }

  pub fn options(&self) -> &LogOptions {
    &self.inner.options
  }

  // --- Write Operations ---

  /// Appends one entry to a stream, creating the stream on first use.
  pub fn append(&self, stream: &str, entry: &str) -> Result<()> {
    self.append_batch(stream, &[entry])
  }

  /// Appends several entries with a single write. Either every line lands
  /// or, on validation failure, none do.
  pub fn append_batch<S: AsRef<str>>(&self, stream: &str, entries: &[S]) -> Result<()> {
    util::validate_id(stream)?;
    if entries.is_empty() {
      return Ok(());
    }
    let lock = self.inner.locks.get_or_create(stream);
    let _guard = lock.lock();
    stream::append_lines(self.root(), stream, entries, &self.inner.options)
  }

  /// Resets a stream to zero length, keeping the same file.
  pub fn reset_stream(&self, stream: &str) -> Result<()> {
    util::validate_id(stream)?;
    let lock = self.existing_stream_lock(stream)?;
    let _guard = lock.lock();
    stream::truncate(self.root(), stream, &self.inner.options)?;
    tracing::debug!(target: "ironlog", stream, "stream reset");
    Ok(())
  }

  // --- Rotation ---

  /// Snapshots a stream into a new archive. The stream is left untouched.
  ///
  /// Fails with `AlreadyExists` if `archive` is taken. After `AlreadyExists`
  /// or `Incomplete` a retry needs a new archive id.
  pub fn rotate(&self, stream: &str, archive: &str) -> Result<()> {
    self.check_rotation_ids(stream, archive)?;

    let snapshot = {
      let lock = self.existing_stream_lock(stream)?;
      let _guard = lock.lock();
      stream::read(self.root(), stream)?
    };

    self.write_archive(stream, archive, &snapshot)
  }

  /// Snapshots a stream into a new archive and resets it, holding the
  /// stream's lock across both steps so no append falls in between.
  ///
  /// If the reset fails once the archive exists, the error is
  /// `Error::Incomplete` and the stream keeps its entries.
  pub fn rotate_and_reset(&self, stream: &str, archive: &str) -> Result<()> {
    self.check_rotation_ids(stream, archive)?;

    let lock = self.existing_stream_lock(stream)?;
    let _guard = lock.lock();

    let snapshot = stream::read(self.root(), stream)?;
    self.write_archive(stream, archive, &snapshot)?;
    stream::truncate(self.root(), stream, &self.inner.options).map_err(|e| e.after_archive(archive))?;
    tracing::debug!(target: "ironlog", stream, "stream reset");
    Ok(())
  }

  /// Rotates every non-empty stream into `<stream>-<unix millis>` and resets
  /// it. Every stream is attempted; a failing stream does not stop the rest.
  ///
  /// Only a failure to read the storage root is returned as `Err`. Per-stream
  /// outcomes are in the report.
  pub fn rotate_all(&self) -> Result<RotationReport> {
    let mut report = RotationReport::default();

    for stream in self.list(false)? {
      match self.rotate_stream_with_fresh_id(&stream) {
        Ok(Some(archive)) => report.rotated.push((stream, archive)),
        Ok(None) => {
          tracing::debug!(target: "ironlog", stream = %stream, "stream empty, skipping rotation");
          report.skipped.push(stream);
        }
        Err(e) => {
          tracing::error!(target: "ironlog", stream = %stream, error = %e, "rotation failed");
          report.failed.push((stream, e));
        }
      }
    }

    Ok(report)
  }

  fn rotate_stream_with_fresh_id(&self, stream: &str) -> Result<Option<String>> {
    let lock = self.existing_stream_lock(stream)?;
    let _guard = lock.lock();

    let snapshot = stream::read(self.root(), stream)?;
    if snapshot.is_empty() {
      return Ok(None);
    }

    let base = format!("{}-{}", stream, unix_millis());
    for attempt in 0..MAX_ARCHIVE_ID_ATTEMPTS {
      let archive = if attempt == 0 {
        base.clone()
      } else {
        format!("{}-{}", base, attempt)
      };

      match self.write_archive(stream, &archive, &snapshot) {
        Ok(()) => {
          stream::truncate(self.root(), stream, &self.inner.options).map_err(|e| e.after_archive(&archive))?;
          return Ok(Some(archive));
        }
        Err(Error::AlreadyExists(_)) => continue,
        Err(e) => return Err(e),
      }
    }

    Err(Error::AlreadyExists(base))
  }

  /// The stream's lock, only handed out once its file exists so that ids
  /// of streams that were never written do not accumulate in the map.
  fn existing_stream_lock(&self, stream: &str) -> Result<Arc<Mutex<()>>> {
    let target = LogFile::Stream(stream.to_string());
    if !target.path_in(self.root()).is_file() {
      return Err(Error::NotFound(target));
    }
    Ok(self.inner.locks.get_or_create(stream))
  }

  fn check_rotation_ids(&self, stream: &str, archive: &str) -> Result<()> {
    util::validate_id(stream)?;
    util::validate_id(archive)?;
    if stream == archive {
      return Err(Error::InvalidId(format!(
        "archive id must differ from its stream id: {}",
        archive
      )));
    }
    // Fail before compressing. The exclusive link in `archive::write`
    // still guards against a concurrent creator.
    if archive::exists(self.root(), archive) {
      return Err(Error::AlreadyExists(archive.to_string()));
    }
    Ok(())
  }

  fn write_archive(&self, stream: &str, archive: &str, snapshot: &str) -> Result<()> {
    let encoded = archive::encode(snapshot, self.inner.options.compression_level)?;
    archive::write(self.root(), archive, &encoded)?;
    tracing::debug!(
      target: "ironlog",
      stream,
      archive,
      raw_bytes = snapshot.len(),
      encoded_bytes = encoded.len(),
      "stream rotated into archive"
    );
    Ok(())
  }

  // --- Read Operations ---

  /// Returns the decompressed text of an archive.
  pub fn retrieve(&self, archive: &str) -> Result<String> {
    util::validate_id(archive)?;
    archive::read(self.root(), archive)
  }

  /// Returns the raw text of an active stream.
  pub fn read_stream(&self, stream: &str) -> Result<String> {
    util::validate_id(stream)?;
    stream::read(self.root(), stream)
  }

  /// Lists stream ids, plus archive ids when `include_archives` is set.
  pub fn list(&self, include_archives: bool) -> Result<BTreeSet<String>> {
    catalog::list_ids(self.root(), include_archives)
  }

  /// Lists every stream and archive in the root, typed.
  pub fn files(&self) -> Result<Vec<LogFile>> {
    catalog::scan(self.root())
  }
}

fn unix_millis() -> u128 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis())
    .unwrap_or_default()
}
