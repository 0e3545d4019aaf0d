//! Exact-match response cache.
//!
//! Keys are the full prompt text; values are the last response stored for
//! it. The cache lives for the process and is handed to runners explicitly
//! (usually behind an `Arc`). By default it never evicts; with a capacity
//! the oldest inserted prompt is dropped first.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::debug;

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, String>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

pub struct ResponseCache {
    inner: Mutex<Inner>,
    capacity: Option<usize>,
}

impl ResponseCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: None,
        }
    }

    /// A cache holding at most `capacity` prompts (oldest evicted first).
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Build from an optional capacity, as read from configuration.
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(n) => Self::with_capacity(n),
            None => Self::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up the response stored for exactly this prompt.
    pub fn get(&self, prompt: &str) -> Option<String> {
        let mut inner = self.lock();
        let found = inner.entries.get(prompt).cloned();
        match found {
            Some(response) => {
                inner.hits += 1;
                debug!(prompt_len = prompt.len(), "Cache hit");
                Some(response)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Store a response, replacing any previous one for the same prompt.
    pub fn insert(&self, prompt: impl Into<String>, response: impl Into<String>) {
        let prompt = prompt.into();
        let mut inner = self.lock();

        if inner.entries.contains_key(&prompt) {
            inner.entries.insert(prompt, response.into());
            return;
        }

        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
                debug!(capacity, "Cache full, evicted oldest entry");
            }
        }

        inner.order.push_back(prompt.clone());
        inner.entries.insert(prompt, response.into());
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
