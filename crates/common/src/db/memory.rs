//! In-memory record store

use crate::db::RecordStore;
use crate::errors::Result;
use crate::records::{Record, INITIAL_VERSION};
use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

/// Keeps records in a map keyed by id. Ids start at 1 and are never reused.
pub struct MemoryStore<R> {
    rows: RwLock<BTreeMap<i32, R>>,
    next_id: AtomicI32,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }

    /// Seed a store with already-persisted records, keeping their ids
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let rows: BTreeMap<i32, R> = records.into_iter().map(|r| (r.id(), r)).collect();
        let next_id = rows.keys().next_back().map_or(1, |last| last + 1);

        Self {
            rows: RwLock::new(rows),
            next_id: AtomicI32::new(next_id),
        }
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn get(&self, id: i32) -> Result<Option<R>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<R>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by(&self, filter: &R::Filter) -> Result<Vec<R>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.matches(filter))
            .cloned()
            .collect())
    }

    async fn save(&self, mut record: R) -> Result<R> {
        let mut rows = self.rows.write().await;

        if !record.is_saved() {
            record.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
            record.set_version(INITIAL_VERSION);
        } else if !rows.contains_key(&record.id()) {
            // Same outcome as an UPDATE matching no row
            return Err(DbErr::RecordNotUpdated.into());
        }

        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: i32) -> Result<()> {
        self.rows.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::records::{Definition, Proof, ProofFilter};

    fn definition(name: &str) -> Definition {
        Definition {
            id: 0,
            version: 7,
            name: name.into(),
            definition: vec!["statement".into()],
            notation: None,
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_initial_version() {
        let store = MemoryStore::new();

        let first = store.save(definition("Set")).await.unwrap();
        let second = store.save(definition("Group")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.version, INITIAL_VERSION);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_existing_overwrites() {
        let store = MemoryStore::new();
        let mut saved = store.save(definition("Set")).await.unwrap();

        saved.name = "Ring".into();
        saved.version += 1;
        store.save(saved.clone()).await.unwrap();

        let found = store.get(saved.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ring");
        assert_eq!(found.version, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let saved = store.save(definition("Set")).await.unwrap();

        store.delete(saved.id).await.unwrap();
        store.delete(saved.id).await.unwrap();
        store.delete(99).await.unwrap();

        assert!(store.get(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_of_deleted_record_is_refused() {
        let store = MemoryStore::new();
        let mut saved = store.save(definition("Set")).await.unwrap();
        store.delete(saved.id).await.unwrap();

        saved.version += 1;
        let err = store.save(saved.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(DbErr::RecordNotUpdated)));
        assert!(store.get(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_ids_are_not_reused() {
        let mut seeded = definition("Set");
        seeded.id = 5;
        let store = MemoryStore::with_records([seeded]);

        let saved = store.save(definition("Group")).await.unwrap();
        assert_eq!(saved.id, 6);
    }

    #[tokio::test]
    async fn test_find_by_filters_on_column() {
        let store = MemoryStore::new();
        for (name, branch) in [("Euclid", "number theory"), ("Thales", "geometry")] {
            store
                .save(Proof {
                    id: 0,
                    version: 0,
                    theorem_name: name.into(),
                    branch: branch.into(),
                    proof: vec!["step".into()],
                    referenced_definitions: None,
                    referenced_theorems: None,
                })
                .await
                .unwrap();
        }

        let found = store.find_by(&ProofFilter::branch("number_theory")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].theorem_name, "Euclid");

        assert!(store.find_by(&ProofFilter::branch("topology")).await.unwrap().is_empty());
    }
}
