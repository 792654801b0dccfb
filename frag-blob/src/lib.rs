//! # frag-blob: storage planes for fragments
//!
//! A fragment is persisted as two records under the same `(owner_id, id)` key:
//! a serialized metadata record and a raw payload. Each lives in its own
//! [`FragmentStore`], so the payload can move to object storage while the
//! metadata stays elsewhere.
//!
//! ```text
//! ┌─────────────────────────────┐
//! │          FragmentDb         │
//! ├──────────────┬──────────────┤
//! │ metadata     │ data         │
//! │ MemoryDb     │ MemoryDb     │  ← StoreConfig::Memory
//! │ MemoryDb     │ S3DataStore  │  ← StoreConfig::S3
//! └──────────────┴──────────────┘
//! ```
//!
//! ```rust
//! use frag_blob::{FragmentDb, FragmentStore};
//!
//! # #[tokio::main]
//! # async fn main() -> frag_blob::StoreResult<()> {
//! let db = FragmentDb::memory();
//! db.data().put("owner", "id", bytes::Bytes::from_static(b"hi")).await?;
//! assert!(db.data().get("owner", "id").await?.is_some());
//! # Ok(())
//! # }
//! ```

mod config;
mod db;
mod error;
mod memory;
mod s3_store;
pub mod store;

pub use config::StoreConfig;
pub use db::{DataStore, FragmentDb, MetadataStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryDb;
pub use s3_store::{S3Config, S3DataStore};
pub use store::{DefaultKeyStrategy, FragmentStore, KeyStrategy, StoreCapabilities};
