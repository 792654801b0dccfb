use std::sync::Arc;

use bytes::Bytes;
use frag_blob::{FragmentDb, FragmentStore, MemoryDb};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_on_distinct_keys_all_land() {
    let db: Arc<MemoryDb<Bytes>> = Arc::new(MemoryDb::new());

    let mut handles = Vec::new();
    for i in 0..64 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            let owner = format!("owner-{}", i % 4);
            db.put(&owner, &format!("id-{i}"), Bytes::from(vec![i as u8; 8]))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut total = 0;
    for owner in 0..4 {
        total += db.keys(&format!("owner-{owner}")).await.unwrap().len();
    }
    assert_eq!(total, 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_on_same_key_leave_one_winner() {
    let db: Arc<MemoryDb<String>> = Arc::new(MemoryDb::new());

    let mut handles = Vec::new();
    for i in 0..32 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            db.put("owner", "same", format!("writer-{i}")).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let values = db.query("owner").await.unwrap();
    assert_eq!(values.len(), 1);
    assert!(values[0].starts_with("writer-"));
}

#[tokio::test]
async fn owners_never_see_each_other() {
    let db = FragmentDb::memory();
    db.metadata().put("alice", "1", "a".to_string()).await.unwrap();
    db.metadata().put("bob", "1", "b".to_string()).await.unwrap();

    assert_eq!(db.metadata().query("alice").await.unwrap(), vec!["a".to_string()]);
    assert_eq!(db.metadata().query("bob").await.unwrap(), vec!["b".to_string()]);

    db.metadata().delete("alice", "1").await.unwrap();
    assert_eq!(db.metadata().get("bob", "1").await.unwrap().as_deref(), Some("b"));
}
