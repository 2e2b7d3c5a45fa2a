//! # Key-Value Queue Item Store
//!
//! `QueueItemStore` over a shared `KeyValueStore`.
//!
//! Layout: `queue:<index as 8 big-endian bytes>` → bincode(`QueueItem`).
//! Big-endian keys make a prefix scan return items in index order.
//!
//! `count` followed by `insert` is not atomic here. `RegistrationQueue`
//! serializes index assignment within one process. Two processes sharing a
//! store can still compute the same index: `insert` rejects a key it sees as
//! taken with `DuplicateIndex`, but its check and write are separate calls.
//!
//! Records that fail to decode are skipped by `find_by_status` with a
//! warning, so one bad record cannot block the resume scan.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{KVStoreError, KeyValueStore};
use tracing::warn;

use crate::domain::{QueueError, QueueItem, QueueItemStatus, QueueResult};
use crate::ports::outbound::QueueItemStore;

/// Key prefix for queue items.
pub const QUEUE_PREFIX: &[u8] = b"queue:";

pub struct KvQueueItemStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvQueueItemStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn make_key(index: i64) -> Vec<u8> {
        let mut key = QUEUE_PREFIX.to_vec();
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    fn encode(item: &QueueItem) -> QueueResult<Vec<u8>> {
        bincode::serialize(item).map_err(|e| {
            KVStoreError::Corrupted {
                key: format!("queue:{}", item.index),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn decode(key: &[u8], bytes: &[u8]) -> QueueResult<QueueItem> {
        bincode::deserialize(bytes).map_err(|e| {
            KVStoreError::Corrupted {
                key: hex_key(key),
                message: e.to_string(),
            }
            .into()
        })
    }
}

fn hex_key(key: &[u8]) -> String {
    let suffix = key.strip_prefix(QUEUE_PREFIX).unwrap_or(key);
    format!("queue:0x{}", hex::encode(suffix))
}

#[async_trait]
impl QueueItemStore for KvQueueItemStore {
    async fn count(&self) -> QueueResult<u64> {
        Ok(self.kv.count_prefix(QUEUE_PREFIX)?)
    }

    async fn insert(&self, item: &QueueItem) -> QueueResult<()> {
        let key = Self::make_key(item.index);
        if self.kv.exists(&key)? {
            return Err(QueueError::DuplicateIndex { index: item.index });
        }
        self.kv.put(&key, &Self::encode(item)?)?;
        Ok(())
    }

    async fn get_by_index(&self, index: i64) -> QueueResult<Option<QueueItem>> {
        let key = Self::make_key(index);
        match self.kv.get(&key)? {
            Some(bytes) => Ok(Some(Self::decode(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn replace(&self, item: &QueueItem) -> QueueResult<()> {
        let key = Self::make_key(item.index);
        if !self.kv.exists(&key)? {
            return Err(QueueError::ItemNotFound { index: item.index });
        }
        self.kv.put(&key, &Self::encode(item)?)?;
        Ok(())
    }

    async fn find_by_status(&self, status: QueueItemStatus) -> QueueResult<Vec<QueueItem>> {
        let mut items = Vec::new();
        for (key, bytes) in self.kv.prefix_scan(QUEUE_PREFIX)? {
            match Self::decode(&key, &bytes) {
                Ok(item) if item.status == status => items.push(item),
                Ok(_) => {}
                Err(e) => {
                    warn!(key = %hex_key(&key), error = %e, "[ns-02] Skipping undecodable item");
                }
            }
        }
        Ok(items)
    }

    async fn flush(&self) -> QueueResult<()> {
        Ok(self.kv.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NameRegisterRequest;
    use shared_types::{InMemoryKVStore, Secret};

    fn item(index: i64) -> QueueItem {
        QueueItem::from_register_request(
            index,
            NameRegisterRequest {
                full_name: format!("name{index}.any"),
                ..Default::default()
            },
            Secret([index as u8; 32]),
            100,
        )
    }

    fn create_store() -> KvQueueItemStore {
        KvQueueItemStore::new(Arc::new(InMemoryKVStore::new()))
    }

    #[tokio::test]
    async fn test_insert_count_and_lookup() {
        let store = create_store();
        assert_eq!(store.count().await.unwrap(), 0);

        store.insert(&item(0)).await.unwrap();
        store.insert(&item(1)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get_by_index(1).await.unwrap(), Some(item(1)));
        assert_eq!(store.get_by_index(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_rejects_taken_index() {
        let store = create_store();
        store.insert(&item(0)).await.unwrap();

        let err = store.insert(&item(0)).await.unwrap_err();
        assert_eq!(err, QueueError::DuplicateIndex { index: 0 });
    }

    #[tokio::test]
    async fn test_replace_requires_existing_item() {
        let store = create_store();
        let err = store.replace(&item(3)).await.unwrap_err();
        assert_eq!(err, QueueError::ItemNotFound { index: 3 });

        store.insert(&item(3)).await.unwrap();
        let mut updated = item(3);
        updated.status = QueueItemStatus::CommitSent;
        store.replace(&updated).await.unwrap();

        assert_eq!(store.get_by_index(3).await.unwrap(), Some(updated));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_status_is_index_ordered() {
        let store = create_store();
        // 256 sorts after 1 only with big-endian keys
        for index in [256, 1, 2] {
            store.insert(&item(index)).await.unwrap();
        }
        let mut done = item(2);
        done.status = QueueItemStatus::Completed;
        store.replace(&done).await.unwrap();

        let initial: Vec<i64> = store
            .find_by_status(QueueItemStatus::Initial)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.index)
            .collect();
        assert_eq!(initial, vec![1, 256]);
    }

    #[tokio::test]
    async fn test_corrupted_item_is_reported() {
        let kv = Arc::new(InMemoryKVStore::new());
        kv.put(&KvQueueItemStore::make_key(5), b"garbage").unwrap();
        let store = KvQueueItemStore::new(kv);

        assert!(matches!(
            store.get_by_index(5).await,
            Err(QueueError::Store(KVStoreError::Corrupted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_scan_skips_corrupted_item() {
        let kv = Arc::new(InMemoryKVStore::new());
        let store = KvQueueItemStore::new(kv.clone());
        store.insert(&item(0)).await.unwrap();
        kv.put(&KvQueueItemStore::make_key(1), b"garbage").unwrap();
        store.insert(&item(2)).await.unwrap();

        let initial: Vec<i64> = store
            .find_by_status(QueueItemStatus::Initial)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.index)
            .collect();
        assert_eq!(initial, vec![0, 2]);
    }
}
