//! Single-key snapshot cache for the full profile list.
//!
//! # Responsibility
//! - Hold at most one snapshot of all profiles with a fixed expiry.
//! - Offer atomic get/set/invalidate on that single key.
//!
//! # Invariants
//! - A snapshot is replaced wholesale, never patched.
//! - An expired snapshot is indistinguishable from an absent one.
//!
//! Concurrent readers may rebuild and `set` after a writer invalidated;
//! the snapshot can then hold pre-mutation data until the next
//! invalidation or expiry.

use crate::model::profile::ProfileEntity;
use log::debug;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Default validity window of a populated snapshot.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Well-known key the snapshot is logged under.
pub const SNAPSHOT_KEY: &str = "profiles";

#[derive(Debug, Clone)]
struct Snapshot {
    profiles: Arc<Vec<ProfileEntity>>,
    expires_at: Instant,
}

/// Owned cache of the full profile list.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    slot: RwLock<Option<Snapshot>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_TTL)
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached list when present and not expired.
    pub fn get(&self) -> Option<Arc<Vec<ProfileEntity>>> {
        self.get_at(Instant::now())
    }

    /// Stores `profiles` as the new snapshot with a fresh expiry.
    pub fn set(&self, profiles: Vec<ProfileEntity>) -> Arc<Vec<ProfileEntity>> {
        self.set_at(profiles, Instant::now())
    }

    /// Drops the snapshot, forcing the next read to rebuild.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.take().is_some() {
            debug!("event=snapshot_invalidate module=cache status=ok key={SNAPSHOT_KEY}");
        }
    }

    /// Whether a non-expired snapshot is currently held.
    pub fn is_populated(&self) -> bool {
        self.get().is_some()
    }

    fn get_at(&self, now: Instant) -> Option<Arc<Vec<ProfileEntity>>> {
        let slot = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_ref() {
            Some(snapshot) if now < snapshot.expires_at => Some(Arc::clone(&snapshot.profiles)),
            _ => None,
        }
    }

    fn set_at(&self, profiles: Vec<ProfileEntity>, now: Instant) -> Arc<Vec<ProfileEntity>> {
        let profiles = Arc::new(profiles);
        let snapshot = Snapshot {
            profiles: Arc::clone(&profiles),
            expires_at: now + self.ttl,
        };
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(snapshot);
        debug!(
            "event=snapshot_set module=cache status=ok key={} count={} ttl_secs={}",
            SNAPSHOT_KEY,
            profiles.len(),
            self.ttl.as_secs()
        );
        profiles
    }
}
