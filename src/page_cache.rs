use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Whole-response cache for listing pages, keyed by path and query string.
/// Entries expire after a fixed TTL; `clear` drops everything at once so a
/// caller holding the handle can invalidate explicitly.
pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedPage>>,
}

struct CachedPage {
    expires_at: Instant,
    body: String,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        PageCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let page = entries.get(key)?;
        if page.expires_at <= Instant::now() {
            return None;
        }
        Some(page.body.clone())
    }

    pub async fn put(&self, key: String, body: String) {
        let page = CachedPage {
            expires_at: Instant::now() + self.ttl,
            body,
        };
        self.entries.write().await.insert(key, page);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
