//! In-memory record store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Record, RecordId, RecordStore, StoreError, StoreResult, UniqueIndex};

/// In-process implementation of [`RecordStore`].
///
/// Records live in a map keyed kind -> id -> fields behind a single
/// read/write lock; inserts hold the write lock across the whole
/// check-then-insert so declared uniqueness constraints cannot race.
pub struct MemoryStore {
    records: RwLock<HashMap<String, HashMap<RecordId, Map<String, Value>>>>,
    unique: Vec<UniqueIndex>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with no uniqueness constraints
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            unique: Vec::new(),
        }
    }

    /// Declare a uniqueness constraint on one field of a record kind
    pub fn with_unique(mut self, kind: impl Into<String>, field: impl Into<String>) -> Self {
        self.unique.push(UniqueIndex {
            kind: kind.into(),
            field: field.into(),
        });
        self
    }
}

fn matches(id: &str, fields: &Map<String, Value>, query: &Map<String, Value>) -> bool {
    query.iter().all(|(key, expected)| {
        if key == "id" {
            expected.as_str() == Some(id)
        } else {
            fields.get(key) == Some(expected)
        }
    })
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, kind: &str, fields: Map<String, Value>) -> StoreResult<RecordId> {
        let mut records = self.records.write().await;
        let bucket = records.entry(kind.to_string()).or_default();

        for constraint in self.unique.iter().filter(|u| u.kind == kind) {
            if let Some(candidate) = fields.get(&constraint.field) {
                let taken = bucket
                    .values()
                    .any(|existing| existing.get(&constraint.field) == Some(candidate));
                if taken {
                    return Err(StoreError::Conflict {
                        kind: kind.to_string(),
                        field: constraint.field.clone(),
                    });
                }
            }
        }

        let id = Uuid::new_v4().to_string();
        bucket.insert(id.clone(), fields);
        Ok(id)
    }

    async fn find(&self, kind: &str, query: &Map<String, Value>) -> StoreResult<Option<Record>> {
        let records = self.records.read().await;
        let Some(bucket) = records.get(kind) else {
            return Ok(None);
        };

        Ok(bucket
            .iter()
            .find(|(id, fields)| matches(id, fields, query))
            .map(|(id, fields)| Record {
                id: id.clone(),
                fields: fields.clone(),
            }))
    }

    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let removed = records
            .get_mut(kind)
            .and_then(|bucket| bucket.remove(id))
            .is_some();

        if removed {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                kind: kind.to_string(),
            })
        }
    }
}
