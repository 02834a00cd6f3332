use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::upstream::Profile;

struct Entry {
    seq: u64,
    profile: Profile,
}

/// Sequence-stamped profile snapshots, keyed by NIP.
///
/// Profile refreshes are not cancelled once started, so two can be in
/// flight at once and complete out of order. Every refresh takes a ticket
/// from `begin()` before awaiting; `store` refuses to overwrite a snapshot
/// written by a later ticket, so a slow stale response can never clobber a
/// newer one.
pub struct ProfileCache {
    seq: AtomicU64,
    inner: Mutex<HashMap<String, Entry>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(1),
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Take a ticket for a refresh that is about to start
    pub fn begin(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Store a snapshot fetched under `ticket`. Returns false (and stores
    /// nothing) when a newer refresh already landed for this NIP.
    pub fn store(&self, ticket: u64, profile: Profile) -> bool {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match inner.get(&profile.nip) {
            Some(existing) if existing.seq > ticket => {
                tracing::debug!(
                    nip = %profile.nip,
                    ticket,
                    newer = existing.seq,
                    "discarding superseded profile refresh"
                );
                false
            }
            _ => {
                inner.insert(
                    profile.nip.clone(),
                    Entry {
                        seq: ticket,
                        profile,
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, nip: &str) -> Option<Profile> {
        let inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.get(nip).map(|e| e.profile.clone())
    }

    pub fn invalidate(&self, nip: &str) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.remove(nip);
    }

    /// Drop everything. Wired as the upstream client's unauthorized hook:
    /// any 401 means our cached identities can no longer be trusted.
    pub fn clear(&self) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.clear();
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn profile(nip: &str, achieved: i64) -> Profile {
        Profile {
            role: Role::Marketing,
            branch_name: "KC Fatmawati".to_string(),
            name: "Ucup Sandy".to_string(),
            nip: nip.to_string(),
            total_target: 500_000_000,
            achieved,
            percentage: 0.0,
            products: serde_json::Value::Null,
            target_month: 8,
            target_year: 2025,
            target_setted: true,
        }
    }

    #[test]
    fn stale_refresh_cannot_overwrite_newer_snapshot() {
        let cache = ProfileCache::new();
        let older = cache.begin();
        let newer = cache.begin();

        // The refresh started later finishes first
        assert!(cache.store(newer, profile("100", 2)));
        // The straggler is discarded
        assert!(!cache.store(older, profile("100", 1)));

        assert_eq!(cache.get("100").unwrap().achieved, 2);
    }

    #[test]
    fn in_order_refreshes_apply_normally() {
        let cache = ProfileCache::new();
        let first = cache.begin();
        assert!(cache.store(first, profile("100", 1)));
        let second = cache.begin();
        assert!(cache.store(second, profile("100", 2)));
        assert_eq!(cache.get("100").unwrap().achieved, 2);
    }

    #[test]
    fn clear_and_invalidate_drop_entries() {
        let cache = ProfileCache::new();
        let t = cache.begin();
        cache.store(t, profile("100", 1));
        cache.invalidate("100");
        assert!(cache.get("100").is_none());

        let t = cache.begin();
        cache.store(t, profile("200", 1));
        cache.clear();
        assert!(cache.get("200").is_none());
    }
}
