use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-stream exclusion, keyed by stream id.
///
/// Appends, snapshots and resets of one stream take its mutex; different
/// streams never contend beyond the brief map lookup.
#[derive(Default)]
pub(crate) struct StreamLocks {
  inner: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl StreamLocks {
  /// Gets the lock for a stream, creating it on first use.
  ///
  /// Double-checked: the common case only takes the map's read lock.
  pub fn get_or_create(&self, stream: &str) -> Arc<Mutex<()>> {
    {
      let map = self.inner.read();
      if let Some(lock) = map.get(stream) {
        return lock.clone();
      }
    }

    let mut map = self.inner.write();
    map
      .entry(stream.to_string())
      .or_insert_with(|| Arc::new(Mutex::new(())))
      .clone()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.inner.read().len()
  }
}
