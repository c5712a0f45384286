//! Short-lived OAuth CSRF state entries
//!
//! The authorization handshake that produces the access credential lives
//! outside this crate, but it needs somewhere to park its anti-forgery
//! state between the redirect out and the callback in. This store keeps
//! those entries explicit and injectable instead of hiding them in
//! framework session state: issue a key before redirecting, consume it
//! exactly once on callback. Entries expire after a TTL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Default entry lifetime; OAuth round trips finish well inside this
const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// In-memory store of pending CSRF state keys
pub struct OauthStateStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl Default for OauthStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl OauthStateStore {
    /// Create a store whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh state key and start its TTL clock
    pub fn issue(&self) -> String {
        let key = Uuid::new_v4().to_string();
        let mut entries = self.entries.lock().expect("state store lock poisoned");
        entries.insert(key.clone(), Instant::now());
        key
    }

    /// Validate and remove a state key
    ///
    /// Returns `true` only for a key that was issued here and has not
    /// expired; a second consume of the same key always fails.
    pub fn consume(&self, state: &str) -> bool {
        let mut entries = self.entries.lock().expect("state store lock poisoned");
        entries.retain(|_, issued_at| issued_at.elapsed() < self.ttl);
        entries.remove(state).is_some()
    }

    /// Number of unexpired, unconsumed entries
    pub fn pending(&self) -> usize {
        let mut entries = self.entries.lock().expect("state store lock poisoned");
        entries.retain(|_, issued_at| issued_at.elapsed() < self.ttl);
        entries.len()
    }
}
