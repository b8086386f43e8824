use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::store::InventoryStore;

struct Session {
    store: InventoryStore,
    last_seen: DateTime<Utc>,
}

/// In-memory stores keyed by session id. Cloning shares the same registry.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Run `f` against the session's store, seeding it on first access.
    pub fn with_store<R>(&self, id: Uuid, f: impl FnOnce(&mut InventoryStore) -> R) -> R {
        self.with_store_at(id, Utc::now(), f)
    }

    fn with_store_at<R>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut InventoryStore) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let cutoff = now - self.idle_ttl;
        sessions.retain(|session_id, session| {
            let keep = session.last_seen >= cutoff;
            if !keep {
                debug!("Evicting idle session {}", session_id);
            }
            keep
        });

        let session = sessions.entry(id).or_insert_with(|| {
            debug!("Starting session {} with seeded inventory", id);
            Session {
                store: InventoryStore::seeded(),
                last_seen: now,
            }
        });
        session.last_seen = now;

        f(&mut session.store)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
