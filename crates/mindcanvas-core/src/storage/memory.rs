//! In-memory storage implementation.

use super::{BoxFuture, MapListing, MapRecord, MapStorage, StorageError, StorageResult};
use crate::document::Document;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    /// Records keyed by user, then by map name.
    users: RwLock<HashMap<String, BTreeMap<String, MapRecord>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record for a map, including its timestamp.
    pub fn record(&self, user: &str, map: &str) -> StorageResult<MapRecord> {
        let users = self.users.read().map_err(lock_error)?;
        users
            .get(user)
            .and_then(|maps| maps.get(map))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(map.to_string()))
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MapStorage for MemoryStorage {
    fn save(&self, user: &str, map: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let user = user.to_string();
        let map = map.to_string();
        let record = MapRecord::now(document.clone());
        Box::pin(async move {
            let mut users = self.users.write().map_err(lock_error)?;
            users.entry(user).or_default().insert(map, record);
            Ok(())
        })
    }

    fn load(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let result = self.record(user, map).map(|record| record.data);
        Box::pin(async move { result })
    }

    fn list(&self, user: &str) -> BoxFuture<'_, StorageResult<MapListing>> {
        let user = user.to_string();
        Box::pin(async move {
            let users = self.users.read().map_err(lock_error)?;
            Ok(users
                .get(&user)
                .map(|maps| {
                    maps.iter()
                        .map(|(name, record)| (name.clone(), record.summary()))
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn delete(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<()>> {
        let user = user.to_string();
        let map = map.to_string();
        Box::pin(async move {
            let mut users = self.users.write().map_err(lock_error)?;
            if let Some(maps) = users.get_mut(&user) {
                maps.remove(&map);
            }
            Ok(())
        })
    }

    fn exists(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let user = user.to_string();
        let map = map.to_string();
        Box::pin(async move {
            let users = self.users.read().map_err(lock_error)?;
            Ok(users.get(&user).is_some_and(|maps| maps.contains_key(&map)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeRecord;
    use crate::storage::block_on;

    fn one_node() -> Document {
        Document {
            nodes: vec![NodeRecord {
                id: 1,
                x: 500.0,
                y: 300.0,
                text: "Central Idea".to_string(),
                color: "#333".to_string(),
                child_ids: vec![],
            }],
            connections: vec![],
            next_id: 2,
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = one_node();

        block_on(storage.save("alice", "plans", &doc)).unwrap();
        let loaded = block_on(storage.load("alice", "plans")).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("alice", "nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_users_are_separate() {
        let storage = MemoryStorage::new();
        block_on(storage.save("alice", "plans", &one_node())).unwrap();

        assert!(block_on(storage.exists("alice", "plans")).unwrap());
        assert!(!block_on(storage.exists("bob", "plans")).unwrap());
        assert!(block_on(storage.list("bob")).unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        block_on(storage.save("alice", "plans", &one_node())).unwrap();
        block_on(storage.delete("alice", "plans")).unwrap();
        assert!(!block_on(storage.exists("alice", "plans")).unwrap());

        // Deleting again is fine.
        block_on(storage.delete("alice", "plans")).unwrap();
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("alice", "b-map", &one_node())).unwrap();
        block_on(storage.save("alice", "a-map", &Document::empty())).unwrap();

        let list = block_on(storage.list("alice")).unwrap();
        let names: Vec<&str> = list.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a-map", "b-map"]);
        assert_eq!(list["b-map"].node_count, 1);
        assert_eq!(list["a-map"].node_count, 0);
    }

    #[test]
    fn test_record_has_timestamp() {
        let storage = MemoryStorage::new();
        block_on(storage.save("alice", "plans", &one_node())).unwrap();
        let record = storage.record("alice", "plans").unwrap();
        assert!(record.updated_at > 0);
        assert_eq!(record.data.next_id, 2);
    }
}
