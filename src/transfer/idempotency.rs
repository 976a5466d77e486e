//! Idempotency key store
//!
//! Process-wide "seen" set for client idempotency keys. Keys are scoped per
//! user and expire after a TTL, after which a replay counts as a fresh request.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

use crate::core_types::UserId;

pub struct IdempotencyStore {
    /// `"{user_id}:{key}"` -> first time seen
    seen: DashMap<String, Instant>,
    ttl: Duration,
}

impl IdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            seen: DashMap::new(),
            ttl,
        }
    }

    fn scoped(user_id: &UserId, key: &str) -> String {
        format!("{}:{}", user_id, key.trim())
    }

    /// Atomically check and mark a key.
    ///
    /// Returns `true` when the key was already seen within the TTL (replay).
    /// Returns `false` and marks the key otherwise.
    pub fn check_and_mark(&self, user_id: &UserId, key: &str) -> bool {
        self.check_and_mark_at(user_id, key, Instant::now())
    }

    pub fn check_and_mark_at(&self, user_id: &UserId, key: &str, now: Instant) -> bool {
        match self.seen.entry(Self::scoped(user_id, key)) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.ttl {
                    true
                } else {
                    entry.insert(now);
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                false
            }
        }
    }

    /// Drop expired keys. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.seen.len();
        self.seen
            .retain(|_, seen_at| now.saturating_duration_since(*seen_at) < self.ttl);
        before.saturating_sub(self.seen.len())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_first_use_then_replay() {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        let user = UserId::new("u1");
        assert!(!store.check_and_mark(&user, "k1"));
        assert!(store.check_and_mark(&user, "k1"));
        assert!(!store.check_and_mark(&user, "k2"));
    }

    #[test]
    fn test_keys_are_scoped_per_user() {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        assert!(!store.check_and_mark(&UserId::new("u1"), "k1"));
        assert!(!store.check_and_mark(&UserId::new("u2"), "k1"));
    }

    #[test]
    fn test_expired_key_is_fresh_again() {
        let store = IdempotencyStore::new(Duration::from_secs(10));
        let user = UserId::new("u1");
        let t0 = Instant::now();
        assert!(!store.check_and_mark_at(&user, "k1", t0));
        assert!(store.check_and_mark_at(&user, "k1", t0 + Duration::from_secs(9)));
        assert!(!store.check_and_mark_at(&user, "k1", t0 + Duration::from_secs(10)));
        // Re-marked at t0+10
        assert!(store.check_and_mark_at(&user, "k1", t0 + Duration::from_secs(15)));
    }

    #[test]
    fn test_purge_expired() {
        let store = IdempotencyStore::new(Duration::from_secs(10));
        let user = UserId::new("u1");
        let t0 = Instant::now();
        store.check_and_mark_at(&user, "old", t0);
        store.check_and_mark_at(&user, "new", t0 + Duration::from_secs(8));

        assert_eq!(store.purge_expired(t0 + Duration::from_secs(12)), 1);
        assert_eq!(store.len(), 1);
        assert!(store.check_and_mark_at(&user, "new", t0 + Duration::from_secs(12)));
    }

    #[test]
    fn test_concurrent_marks_admit_exactly_one() {
        let store = Arc::new(IdempotencyStore::new(Duration::from_secs(60)));
        let fresh = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let fresh = fresh.clone();
                std::thread::spawn(move || {
                    if !store.check_and_mark(&UserId::new("u1"), "same-key") {
                        fresh.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(fresh.load(Ordering::SeqCst), 1);
    }
}
