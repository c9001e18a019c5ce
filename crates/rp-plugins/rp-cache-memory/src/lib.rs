//! # rp-cache-memory
//!
//! In-process implementation of `PageCache`: a dashmap of rendered responses
//! under caller-chosen keys, each entry valid for a fixed TTL. Expired entries
//! are dropped lazily on the next lookup; there is no write-through
//! invalidation, so staleness is bounded only by the TTL.

use dashmap::DashMap;
use rp_core::traits::PageCache;
use std::time::{Duration, Instant};

struct Entry {
    body: String,
    stored_at: Instant,
}

pub struct MemoryPageCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemoryPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => {
                if entry.stored_at.elapsed() < self.ttl {
                    return Some(entry.body.clone());
                }
                true
            }
        };
        // Guard dropped above; safe to remove now.
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn put(&self, key: String, body: String) {
        self.entries.insert(
            key,
            Entry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
