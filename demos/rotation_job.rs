//! Example: a scheduled rotation job over a storage root
//!
//! This example demonstrates:
//! - Appending access-log lines to several streams
//! - Rotating every non-empty stream into a timestamped archive
//! - Listing and retrieving archives

use ironlog::{LogFile, LogOptions, LogStore};
use tracing_subscriber::EnvFilter;

fn main() -> ironlog::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ironlog=debug")))
    .init();

  println!("=== IronLog Rotation Example ===\n");

  let root = std::path::PathBuf::from("./example_logs");
  std::fs::create_dir_all(&root)?;
  let store = LogStore::new(LogOptions::new(&root))?;

  // 1. Write some entries
  println!("--- Writing Data ---");
  for i in 0..5 {
    store.append("http", &format!("GET /checks/{} 200", i))?;
  }
  store.append("workers", "rotation job started")?;
  println!("  streams: {:?}", store.list(false)?);

  // 2. Rotate everything
  println!("\n--- Rotating ---");
  let report = store.rotate_all()?;
  for (stream, archive) in &report.rotated {
    println!("  {} -> {}", stream, archive);
  }
  for (stream, err) in &report.failed {
    println!("  {} failed: {}", stream, err);
  }

  // 3. Inspect archives
  println!("\n--- Archives ---");
  for file in store.files()? {
    if let LogFile::Archive(id) = file {
      let text = store.retrieve(&id)?;
      println!("  {} ({} lines)", id, text.lines().count());
    }
  }

  Ok(())
}
