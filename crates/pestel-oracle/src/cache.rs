//! Response cache keyed by rendered prompt.
//!
//! Identical prompts are common: agents with unchanged context re-ask the
//! same question on quiet days, and impact prompts repeat across agents.
//! Entries are evicted oldest-first once the capacity is reached.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;

use crate::prompt::RenderedPrompt;

/// Which question a cached response answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestKind {
    /// A "should this agent act" prompt.
    Decision,
    /// A "what does this decision change" prompt.
    Impact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: RequestKind,
    hash: u64,
}

impl CacheKey {
    fn new(kind: RequestKind, prompt: &RenderedPrompt) -> Self {
        let mut hasher = DefaultHasher::new();
        prompt.hash(&mut hasher);
        Self {
            kind,
            hash: hasher.finish(),
        }
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that went to the backend.
    pub misses: u64,
}

/// FIFO cache of raw backend responses.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    enabled: bool,
    capacity: usize,
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl ResponseCache {
    /// A cache holding at most `capacity` responses.
    pub fn new(capacity: usize) -> Self {
        Self {
            enabled: capacity > 0,
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Look up a response, counting the hit or miss.
    pub fn get(&mut self, kind: RequestKind, prompt: &RenderedPrompt) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        let key = CacheKey::new(kind, prompt);
        if let Some(response) = self.entries.get(&key) {
            self.stats.hits = self.stats.hits.saturating_add(1);
            Some(response.as_str())
        } else {
            self.stats.misses = self.stats.misses.saturating_add(1);
            None
        }
    }

    /// Store a response, evicting the oldest entry when full.
    pub fn insert(&mut self, kind: RequestKind, prompt: &RenderedPrompt, response: String) {
        if !self.enabled {
            return;
        }
        let key = CacheKey::new(kind, prompt);
        if self.entries.insert(key, response).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit and miss counters.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}
