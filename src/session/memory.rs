//! In-memory session registry.
//!
//! Uses `DashMap` for concurrent access without external locks.
//! Sessions expire `max_age` after creation (default: 30 days). Expired
//! entries are swept every [`SWEEP_EVERY`] creations, so sessions minted
//! by anonymous or denied requests do not accumulate.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::{ResolvedSession, SessionProvider, generate_session_id};

/// In-memory session provider.
///
/// Sessions are lost on restart and not shared across processes.
pub struct InMemorySessions {
    store: DashMap<String, Instant>,
    max_age: Duration,
    creations: AtomicU64,
}

/// Number of session creations between sweeps of expired entries.
pub const SWEEP_EVERY: u64 = 256;

impl InMemorySessions {
    pub fn new() -> Self {
        Self::with_max_age(Duration::from_secs(30 * 24 * 3600))
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            store: DashMap::new(),
            max_age,
            creations: AtomicU64::new(0),
        }
    }

    /// Whether `session_id` names a live session. Expired entries are evicted.
    pub fn is_live(&self, session_id: &str) -> bool {
        let Some(entry) = self.store.get(session_id) else {
            return false;
        };
        if entry.value().elapsed() > self.max_age {
            drop(entry); // Release the read lock before removing
            self.store.remove(session_id);
            return false;
        }
        true
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, created| created.elapsed() <= self.max_age);
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            tracing::debug!(removed, "expired sessions purged");
        }
        removed
    }

    /// Number of sessions currently stored (including expired).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for InMemorySessions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for InMemorySessions {
    fn get_or_create_session_id(&self, requested: Option<&str>) -> ResolvedSession {
        if let Some(id) = requested
            && self.is_live(id)
        {
            return ResolvedSession {
                id: id.to_string(),
                created: false,
            };
        }

        if self.creations.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.purge_expired();
        }

        let id = generate_session_id();
        self.store.insert(id.clone(), Instant::now());
        tracing::debug!(stale_requested = requested.is_some(), "session created");
        ResolvedSession { id, created: true }
    }

    fn end_session(&self, session_id: &str) {
        self.store.remove(session_id);
    }
}
