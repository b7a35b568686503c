//! # IronLog
//!
//! `ironlog` is a small file-backed operational log archiver. It appends
//! line-oriented entries to named streams, rotates a stream into an immutable
//! compressed archive, and retrieves archived text on demand.
//!
//! ## Layout
//!
//! Everything lives flat in one storage root:
//!
//! * `<stream>.log`: active stream, newline-terminated entries, append-only.
//! * `<archive>.gz.b64`: base64 text of a gzip stream, never overwritten.
//!
//! ## Guarantees
//!
//! * **Whole entries**: each append is a single write of complete lines.
//! * **Atomic archives**: archives are written to a hidden temporary and
//!   linked into place, so a partial archive is never visible.
//! * **Exclusive archives**: rotating into an existing archive id fails with
//!   [`Error::AlreadyExists`] and leaves the existing archive intact.
//! * **Lossless rotation**: [`LogStore::rotate_and_reset`] holds the stream's
//!   lock across snapshot and reset, so no concurrent append is dropped.
//!
//! ## Example
//!
//! ```no_run
//! use ironlog::{LogOptions, LogStore};
//!
//! # fn main() -> ironlog::Result<()> {
//! let store = LogStore::new(LogOptions::new("./.logs"))?;
//!
//! store.append("http", "request A")?;
//! store.append("http", "request B")?;
//!
//! store.rotate_and_reset("http", "http-2024")?;
//! assert_eq!(store.retrieve("http-2024")?, "request A\nrequest B\n");
//! # Ok(())
//! # }
//! ```

mod archive;
mod catalog;
mod config;
mod error;
mod store;
mod stream;
mod util;

pub use catalog::LogFile;
pub use config::{LogOptions, SyncMode};
pub use error::{Error, Result};
pub use store::{LogStore, RotationReport};
pub use util::{ARCHIVE_SUFFIX, STREAM_SUFFIX};
