use async_trait::async_trait;

use crate::StoreResult;

/// Key-value persistence for one plane of fragment state (metadata or payload).
///
/// Every entry lives in its owner's partition and is addressed by
/// `(owner_id, id)`. Nothing crosses partitions: `query` and `keys` only ever
/// see the given owner's entries.
#[async_trait]
pub trait FragmentStore<V>: Send + Sync
where
    V: Send + Sync + 'static,
{
    /// Store or overwrite `value` under `(owner_id, id)`
    async fn put(&self, owner_id: &str, id: &str, value: V) -> StoreResult<()>;

    /// Read the value under `(owner_id, id)`, `None` when the key is absent
    async fn get(&self, owner_id: &str, id: &str) -> StoreResult<Option<V>>;

    /// All values in the owner's partition, unordered. Empty when the owner has nothing.
    async fn query(&self, owner_id: &str) -> StoreResult<Vec<V>>;

    /// All ids in the owner's partition, unordered
    async fn keys(&self, owner_id: &str) -> StoreResult<Vec<String>>;

    /// Remove the entry. Deleting an absent key succeeds.
    async fn delete(&self, owner_id: &str, id: &str) -> StoreResult<()>;

    /// Get store capabilities
    fn capabilities(&self) -> StoreCapabilities;
}

/// Store capabilities
#[derive(Debug, Clone, Default)]
pub struct StoreCapabilities {
    pub name: &'static str,
    pub durable: bool,
    pub remote: bool,
}

impl StoreCapabilities {
    pub fn volatile(name: &'static str) -> Self {
        Self {
            name,
            durable: false,
            remote: false,
        }
    }

    pub fn remote(name: &'static str) -> Self {
        Self {
            name,
            durable: true,
            remote: true,
        }
    }
}

/// Strategy for naming objects in a flat remote namespace
pub trait KeyStrategy: Send + Sync {
    /// Key for a fragment's object
    fn object_key(&self, owner_id: &str, id: &str) -> String;

    /// Prefix shared by all of an owner's objects
    fn owner_prefix(&self, owner_id: &str) -> String;

    /// Recover the fragment id from an object key, if it belongs to the owner
    fn id_from_key(&self, owner_id: &str, key: &str) -> Option<String> {
        key.strip_prefix(&self.owner_prefix(owner_id))
            .filter(|id| !id.is_empty() && !id.contains('/'))
            .map(str::to_string)
    }
}

/// Default key strategy: owner/id
#[derive(Debug, Clone, Default)]
pub struct DefaultKeyStrategy;

impl KeyStrategy for DefaultKeyStrategy {
    fn object_key(&self, owner_id: &str, id: &str) -> String {
        format!("{}/{}", owner_id, id)
    }

    fn owner_prefix(&self, owner_id: &str) -> String {
        format!("{}/", owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_are_owner_slash_id() {
        let keys = DefaultKeyStrategy;
        assert_eq!(keys.object_key("owner", "abc"), "owner/abc");
        assert_eq!(keys.owner_prefix("owner"), "owner/");
    }

    #[test]
    fn id_from_key_rejects_foreign_and_nested_keys() {
        let keys = DefaultKeyStrategy;
        assert_eq!(keys.id_from_key("owner", "owner/abc"), Some("abc".to_string()));
        assert_eq!(keys.id_from_key("owner", "other/abc"), None);
        assert_eq!(keys.id_from_key("owner", "owner/"), None);
        assert_eq!(keys.id_from_key("owner", "owner/a/b"), None);
        // "own" must not match keys of "owner"
        assert_eq!(keys.id_from_key("own", "owner/abc"), None);
    }
}
