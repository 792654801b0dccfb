use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{FragmentStore, StoreCapabilities, StoreResult};

// owner_id -> id -> value
type Partitions<V> = HashMap<String, HashMap<String, V>>;

/// In-process volatile store, one map per owner.
///
/// Cloning shares the underlying map. Concurrent writers to the same key race
/// and the last one wins.
pub struct MemoryDb<V> {
    db: Arc<RwLock<Partitions<V>>>,
}

impl<V> MemoryDb<V> {
    pub fn new() -> Self {
        Self {
            db: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V> Default for MemoryDb<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for MemoryDb<V> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

#[async_trait]
impl<V> FragmentStore<V> for MemoryDb<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn put(&self, owner_id: &str, id: &str, value: V) -> StoreResult<()> {
        let mut db = self.db.write();
        db.entry(owner_id.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> StoreResult<Option<V>> {
        let db = self.db.read();
        Ok(db.get(owner_id).and_then(|owned| owned.get(id)).cloned())
    }

    async fn query(&self, owner_id: &str) -> StoreResult<Vec<V>> {
        let db = self.db.read();
        Ok(db
            .get(owner_id)
            .map(|owned| owned.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn keys(&self, owner_id: &str) -> StoreResult<Vec<String>> {
        let db = self.db.read();
        Ok(db
            .get(owner_id)
            .map(|owned| owned.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> StoreResult<()> {
        let mut db = self.db.write();
        if let Some(owned) = db.get_mut(owner_id) {
            owned.remove(id);
            if owned.is_empty() {
                db.remove(owner_id);
            }
        }
        Ok(())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::volatile("memory")
    }
}
