//! Bounded, time-limited cache of personnel records.
//!
//! # Responsibility
//! - Serve reads in front of file storage (cache-aside).
//! - Bound memory by entry count with least-recently-used eviction.
//! - Expire entries a fixed time after their last write.
//!
//! # Invariants
//! - An expired entry is never returned, whatever the capacity pressure.
//! - LRU order is refreshed by both reads and writes; TTL only by writes.
//! - One mutex guards the map and the recency index together, so readers never
//!   observe a half-applied insert or eviction.

use crate::model::personal::{Personal, PersonalId};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Personal,
    written_at: Instant,
    /// Key into `CacheState::recency`.
    last_access: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PersonalId, CacheEntry>,
    /// Access stamp -> id, oldest first.
    recency: BTreeMap<u64, PersonalId>,
    next_stamp: u64,
}

impl CacheState {
    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn touch(&mut self, id: PersonalId) {
        let stamp = self.stamp();
        if let Some(entry) = self.entries.get_mut(&id) {
            self.recency.remove(&entry.last_access);
            entry.last_access = stamp;
            self.recency.insert(stamp, id);
        }
    }

    fn remove(&mut self, id: PersonalId) -> Option<CacheEntry> {
        let entry = self.entries.remove(&id)?;
        self.recency.remove(&entry.last_access);
        Some(entry)
    }

    fn purge_expired(&mut self, ttl: Duration, now: Instant) -> usize {
        let expired: Vec<PersonalId> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_expired(entry, ttl, now))
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.remove(*id);
        }
        expired.len()
    }

    fn evict_least_recent(&mut self) -> Option<PersonalId> {
        let (_, id) = self.recency.pop_first()?;
        self.entries.remove(&id);
        Some(id)
    }
}

/// Thread-safe LRU + write-TTL cache keyed by personnel id.
pub struct PersonalCache {
    capacity: NonZeroUsize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl PersonalCache {
    /// Creates an empty cache.
    ///
    /// A zero `ttl` makes every entry expire immediately.
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        debug!(
            "event=cache_init module=cache status=ok capacity={} ttl_ms={}",
            capacity,
            ttl.as_millis()
        );
        Self {
            capacity,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a clone of the live entry for `id`, refreshing its recency.
    pub fn get(&self, id: PersonalId) -> Option<Personal> {
        let now = Instant::now();
        let mut state = self.lock();

        let expired = is_expired(state.entries.get(&id)?, self.ttl, now);
        if expired {
            state.remove(id);
            debug!("event=cache_expire module=cache status=ok id={id}");
            return None;
        }

        state.touch(id);
        state.entries.get(&id).map(|entry| entry.value.clone())
    }

    /// Inserts or replaces the entry for `id`, restarting its TTL.
    ///
    /// When a new key would exceed capacity, expired entries are purged
    /// first and then the least-recently-used entry is evicted.
    pub fn put(&self, id: PersonalId, value: Personal) {
        let now = Instant::now();
        let mut state = self.lock();

        if state.entries.contains_key(&id) {
            if let Some(entry) = state.entries.get_mut(&id) {
                entry.value = value;
                entry.written_at = now;
            }
            state.touch(id);
            return;
        }

        if state.entries.len() >= self.capacity.get() {
            let purged = state.purge_expired(self.ttl, now);
            if purged > 0 {
                debug!("event=cache_expire module=cache status=ok purged={purged}");
            }
        }
        while state.entries.len() >= self.capacity.get() {
            match state.evict_least_recent() {
                Some(evicted) => {
                    debug!("event=cache_evict module=cache status=ok reason=capacity id={evicted}")
                }
                None => break,
            }
        }

        let stamp = state.stamp();
        state.entries.insert(
            id,
            CacheEntry {
                value,
                written_at: now,
                last_access: stamp,
            },
        );
        state.recency.insert(stamp, id);
    }

    /// Replaces the live entry for `id` with the value built from it, under a
    /// single lock.
    ///
    /// Returns `None` when no live entry exists; an expired one is dropped.
    /// When `build` fails the entry is left as it was. A successful
    /// replacement restarts the TTL and refreshes recency.
    pub fn replace_live<E, F>(&self, id: PersonalId, build: F) -> Option<Result<Personal, E>>
    where
        F: FnOnce(&Personal) -> Result<Personal, E>,
    {
        let now = Instant::now();
        let mut state = self.lock();

        if is_expired(state.entries.get(&id)?, self.ttl, now) {
            state.remove(id);
            debug!("event=cache_expire module=cache status=ok id={id}");
            return None;
        }

        let entry = state.entries.get_mut(&id)?;
        let replacement = match build(&entry.value) {
            Ok(replacement) => replacement,
            Err(err) => return Some(Err(err)),
        };
        entry.value = replacement.clone();
        entry.written_at = now;
        state.touch(id);
        Some(Ok(replacement))
    }

    /// Removes and returns the live entry for `id`.
    ///
    /// An expired entry is dropped and reported as absent.
    pub fn invalidate(&self, id: PersonalId) -> Option<Personal> {
        let now = Instant::now();
        let entry = self.lock().remove(id)?;
        if is_expired(&entry, self.ttl, now) {
            return None;
        }
        Some(entry.value)
    }

    /// Drops every entry.
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.recency.clear();
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        let now = Instant::now();
        let mut state = self.lock();
        state.purge_expired(self.ttl, now);
        state.entries.len()
    }

    /// Snapshot of live entries ordered by id.
    ///
    /// Does not change recency.
    pub fn values(&self) -> Vec<Personal> {
        let now = Instant::now();
        let mut state = self.lock();
        state.purge_expired(self.ttl, now);

        let mut values: Vec<Personal> = state
            .entries
            .values()
            .map(|entry| entry.value.clone())
            .collect();
        values.sort_by_key(|value| value.id);
        values
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave the map and the recency
        // index out of step, so a poisoned state is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_expired(entry: &CacheEntry, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(entry.written_at) >= ttl
}
