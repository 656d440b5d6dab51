use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::store::kv::{KeyValueStore, PersistKey, save_ids};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

struct Pending {
    ids: Vec<String>,
    generation: u64,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Slots {
    pending: HashMap<PersistKey, Pending>,
    latest: HashMap<PersistKey, Vec<String>>,
    generation: u64,
}

/// Delays and coalesces id-list writes, one timer per storage key.
///
/// Rescheduling a key replaces its pending value and restarts its timer, so
/// only the latest value is written once the key has been quiet for `window`.
/// Write failures are logged and dropped; the value stays readable through
/// [`Debouncer::latest`] for the rest of the session.
#[derive(Clone)]
pub struct Debouncer {
    window: Duration,
    sink: Arc<dyn KeyValueStore>,
    slots: Arc<Mutex<Slots>>,
}

impl Debouncer {
    pub fn new(sink: Arc<dyn KeyValueStore>, window: Duration) -> Self {
        Self {
            window,
            sink,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, key: PersistKey, ids: Vec<String>) {
        let mut slots = lock(&self.slots);
        slots.generation += 1;
        let generation = slots.generation;

        slots.latest.insert(key, ids.clone());

        let this = self.clone();
        let window = self.window;
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            this.fire(key, generation);
        });

        if let Some(prev) = slots.pending.insert(
            key,
            Pending {
                ids,
                generation,
                task,
            },
        ) {
            prev.task.abort();
            log::debug!("Coalesced pending {} write", key.as_str());
        }
    }

    /// Value waiting to be written for `key`, if any.
    pub fn pending(&self, key: PersistKey) -> Option<Vec<String>> {
        lock(&self.slots).pending.get(&key).map(|p| p.ids.clone())
    }

    /// Last value scheduled for `key` this session, written or not.
    pub fn latest(&self, key: PersistKey) -> Option<Vec<String>> {
        lock(&self.slots).latest.get(&key).cloned()
    }

    pub fn is_pending(&self, key: PersistKey) -> bool {
        lock(&self.slots).pending.contains_key(&key)
    }

    /// Drop the pending write for `key` without writing it.
    pub fn cancel(&self, key: PersistKey) -> bool {
        match lock(&self.slots).pending.remove(&key) {
            Some(p) => {
                p.task.abort();
                true
            }
            None => false,
        }
    }

    /// Write every pending value now.
    pub fn flush(&self) {
        let drained: Vec<(PersistKey, Pending)> = lock(&self.slots).pending.drain().collect();
        for (key, p) in drained {
            p.task.abort();
            self.write(key, &p.ids);
        }
    }

    fn fire(&self, key: PersistKey, generation: u64) {
        let ids = {
            let mut slots = lock(&self.slots);
            match slots.pending.get(&key) {
                Some(p) if p.generation == generation => slots.pending.remove(&key).map(|p| p.ids),
                _ => None,
            }
        };
        if let Some(ids) = ids {
            self.write(key, &ids);
        }
    }

    fn write(&self, key: PersistKey, ids: &[String]) {
        match save_ids(self.sink.as_ref(), key, ids) {
            Ok(()) => log::debug!("Persisted {} ({} ids)", key.as_str(), ids.len()),
            Err(e) => log::warn!("Failed to persist {}: {e}", key.as_str()),
        }
    }
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
