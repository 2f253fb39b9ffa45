// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL cache for read-heavy dashboard payloads.
//!
//! Cache-aside: handlers try the cache, compute on miss, and every
//! booking or lot mutation clears it. Entries also expire on their own
//! so a missed invalidation heals within one TTL.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

pub struct TtlCache {
    entries: DashMap<String, (Instant, Value)>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a live entry, dropping it if expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let (inserted, value) = entry.value();
                if inserted.elapsed() < self.ttl {
                    return Some(value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), (Instant::now(), value));
    }

    /// Drop everything. Called after any write that changes availability.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
