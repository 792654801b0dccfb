use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::{FragmentStore, MemoryDb, S3DataStore, StoreConfig, StoreResult};

/// Metadata plane: serialized (JSON) fragment records
pub type MetadataStore = Arc<dyn FragmentStore<String>>;

/// Data plane: raw payload bytes
pub type DataStore = Arc<dyn FragmentStore<Bytes>>;

/// The two storage planes behind a fragment repository.
///
/// The planes are independent stores with no shared transaction. Writers that
/// touch both are expected to write the payload before the metadata.
#[derive(Clone)]
pub struct FragmentDb {
    metadata: MetadataStore,
    data: DataStore,
}

impl FragmentDb {
    pub fn new(metadata: MetadataStore, data: DataStore) -> Self {
        Self { metadata, data }
    }

    /// Both planes in memory
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryDb::<String>::new()), Arc::new(MemoryDb::<Bytes>::new()))
    }

    /// In-memory metadata with the given payload store
    pub fn with_data_store<D: FragmentStore<Bytes> + 'static>(data: D) -> Self {
        Self::new(Arc::new(MemoryDb::<String>::new()), Arc::new(data))
    }

    /// Build the backend selected by `config`
    pub async fn from_config(config: StoreConfig) -> StoreResult<Self> {
        let db = match config {
            StoreConfig::Memory => Self::memory(),
            StoreConfig::S3(s3) => Self::with_data_store(S3DataStore::connect(s3).await?),
        };

        info!(
            metadata = db.metadata.capabilities().name,
            data = db.data.capabilities().name,
            "fragment storage ready"
        );
        Ok(db)
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_planes_are_independent() {
        let db = FragmentDb::memory();
        db.metadata().put("o", "1", "{}".to_string()).await.unwrap();

        assert_eq!(db.metadata().keys("o").await.unwrap(), vec!["1".to_string()]);
        assert!(db.data().keys("o").await.unwrap().is_empty());
        assert_eq!(db.data().get("o", "1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn from_config_memory() {
        let db = FragmentDb::from_config(StoreConfig::Memory).await.unwrap();
        assert!(!db.data().capabilities().remote);
        assert!(!db.metadata().capabilities().durable);
    }

    #[tokio::test]
    async fn clones_share_planes() {
        let db = FragmentDb::memory();
        let other = db.clone();
        db.data().put("o", "1", Bytes::from_static(b"x")).await.unwrap();
        assert_eq!(
            other.data().get("o", "1").await.unwrap(),
            Some(Bytes::from_static(b"x"))
        );
    }
}
