//! Per-group advisory locking
//!
//! Two concurrent misses for the same group would otherwise interleave
//! the clean phase of one request with the persist phase of the other,
//! deleting a freshly-written artifact. The whole miss path runs under
//! the group's lock; different groups never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lazily-allocated registry of one async mutex per group id
#[derive(Debug, Default)]
pub struct GroupLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl GroupLocks {
    /// Create an empty lock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a group, waiting if another request holds it
    pub async fn acquire(&self, group_id: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(group_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }
}
