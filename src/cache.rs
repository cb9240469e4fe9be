//! Run-scoped reference cache
//!
//! Maps a remote reference (the type/move URL handed out by a Pokémon body)
//! to the id it resolved to. The id is only known after the fetch, so the
//! key has to be the URL itself.

use std::collections::HashMap;

/// Unbounded URL → id map that lives for one ingestion run.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    resolved: HashMap<String, i64>,
    hits: usize,
    misses: usize,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a reference, counting the hit or miss
    pub fn lookup(&mut self, reference: &str) -> Option<i64> {
        match self.resolved.get(reference) {
            Some(&id) => {
                self.hits += 1;
                Some(id)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up without touching the counters
    pub fn peek(&self, reference: &str) -> Option<i64> {
        self.resolved.get(reference).copied()
    }

    pub fn insert(&mut self, reference: impl Into<String>, id: i64) {
        self.resolved.insert(reference.into(), id);
    }

    /// Take over every entry of `other`; counters are left alone
    pub fn merge(&mut self, other: ReferenceCache) {
        self.resolved.extend(other.resolved);
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.resolved.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
