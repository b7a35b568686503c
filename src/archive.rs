use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::PersistError;

use crate::catalog::LogFile;
use crate::error::{Error, Result};
use crate::util;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compresses `text` with gzip and encodes the result as base64.
pub(crate) fn encode(text: &str, level: u32) -> Result<String> {
  let mut encoder = GzEncoder::new(Vec::with_capacity(text.len() / 2), Compression::new(level));
  encoder.write_all(text.as_bytes())?;
  let compressed = encoder.finish()?;
  Ok(STANDARD.encode(compressed))
}

/// Reverses `encode`. Zlib-wrapped payloads are accepted as well.
pub(crate) fn decode(encoded: &str) -> Result<String> {
  let compressed = STANDARD
    .decode(encoded.trim())
    .map_err(|e| Error::Corruption(format!("invalid base64: {}", e)))?;

  let mut text = String::new();
  let inflated = if compressed.starts_with(&GZIP_MAGIC) {
    MultiGzDecoder::new(compressed.as_slice()).read_to_string(&mut text)
  } else {
    ZlibDecoder::new(compressed.as_slice()).read_to_string(&mut text)
  };
  inflated.map_err(|e| Error::Corruption(format!("inflate failed: {}", e)))?;

  Ok(text)
}

/// Writes an archive without ever exposing a partial file under its final
/// name, and without replacing an existing archive.
///
/// The encoded text goes to a hidden temporary in `root`, is synced, then
/// linked into place with no-clobber semantics. The temporary is removed on
/// every path; a failed removal is logged, not returned.
pub(crate) fn write(root: &Path, archive: &str, encoded: &str) -> Result<()> {
  let final_path = LogFile::Archive(archive.to_string()).path_in(root);

  let mut temp = tempfile::Builder::new()
    .prefix(".")
    .suffix(".tmp")
    .tempfile_in(root)?;
  temp.write_all(encoded.as_bytes())?;
  temp.flush()?;
  temp.as_file().sync_all()?;

  if let Err(PersistError { error, file }) = temp.persist_noclobber(&final_path) {
    let temp_path = file.path().to_path_buf();
    if let Err(cleanup) = file.close() {
      tracing::warn!(
        target: "ironlog",
        path = %temp_path.display(),
        error = %cleanup,
        "Failed to remove archive temporary"
      );
    }
    return match error.kind() {
      std::io::ErrorKind::AlreadyExists => Err(Error::AlreadyExists(archive.to_string())),
      _ => Err(Error::Io(error)),
    };
  }

  // The archive is visible from here on.
  util::sync_dir(root).map_err(|source| Error::Incomplete {
    archive: archive.to_string(),
    source,
  })
}

/// Reads and decodes an archive.
pub(crate) fn read(root: &Path, archive: &str) -> Result<String> {
  let target = LogFile::Archive(archive.to_string());
  let encoded = fs::read_to_string(target.path_in(root)).map_err(|e| Error::from_io(e, target))?;
  decode(&encoded)
}

pub(crate) fn exists(root: &Path, archive: &str) -> bool {
  LogFile::Archive(archive.to_string()).path_in(root).exists()
}
