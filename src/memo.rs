use std::collections::{HashMap, VecDeque};
use std::future::Future;

use tokio::sync::Mutex;

use crate::response::Verdict;

/// Bounded question → verdict cache.
///
/// Insertion order is tracked so the oldest entry is evicted once the
/// capacity is reached. The lock is never held across an endpoint
/// roundtrip, so two concurrent misses for the same question may both
/// compute; the later insert overwrites and the map stays at one entry
/// per question. A stored question is never recomputed.
pub struct ResponseMemo {
    capacity: usize,
    inner: Mutex<MemoInner>,
}

#[derive(Default)]
struct MemoInner {
    map: HashMap<String, Verdict>,
    order: VecDeque<String>,
}

impl ResponseMemo {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(MemoInner::default()),
        }
    }

    /// Return the stored verdict for `key`, or run `compute` and store
    /// its result.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Verdict
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Verdict>,
    {
        {
            let inner = self.inner.lock().await;
            if let Some(hit) = inner.map.get(key) {
                return hit.clone();
            }
        }

        // Guard dropped before the roundtrip to avoid holding the lock
        // across slow I/O.
        let verdict = compute().await;

        let mut inner = self.inner.lock().await;
        inner.insert_bounded(self.capacity, key, verdict.clone());
        verdict
    }

    pub async fn get(&self, key: &str) -> Option<Verdict> {
        self.inner.lock().await.map.get(key).cloned()
    }

    pub async fn entry_count(&self) -> usize {
        self.inner.lock().await.map.len()
    }
}

impl MemoInner {
    fn insert_bounded(&mut self, capacity: usize, key: &str, verdict: Verdict) {
        if capacity == 0 {
            return;
        }
        if self.map.contains_key(key) {
            // Lost a concurrent-miss race: overwrite without a second
            // order entry.
            self.map.insert(key.to_string(), verdict);
            return;
        }
        while self.map.len() >= capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.map.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.to_string());
        self.map.insert(key.to_string(), verdict);
    }
}
