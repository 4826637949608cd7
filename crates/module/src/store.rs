//! Record storage port and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use kosmos_core::{Record, RecordId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("{record} {id} does not exist")]
    Missing { record: &'static str, id: RecordId },
}

/// Persistence for one record type. Rows are never physically removed;
/// deletion is an `update` carrying the soft-delete audit fields.
pub trait RecordStore<T: Record>: Send + Sync {
    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError>;

    /// Assigns the record id and returns the stored row.
    fn insert(&self, record: T) -> Result<T, StoreError>;

    fn update(&self, record: T) -> Result<(), StoreError>;

    /// Every row, deleted or not, in id order.
    fn list(&self) -> Result<Vec<T>, StoreError>;
}

impl<T, S> RecordStore<T> for Arc<S>
where
    T: Record,
    S: RecordStore<T> + ?Sized,
{
    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        (**self).get(id)
    }

    fn insert(&self, record: T) -> Result<T, StoreError> {
        (**self).insert(record)
    }

    fn update(&self, record: T) -> Result<(), StoreError> {
        (**self).update(record)
    }

    fn list(&self) -> Result<Vec<T>, StoreError> {
        (**self).list()
    }
}

#[derive(Debug)]
struct Rows<T> {
    next_id: i32,
    rows: BTreeMap<RecordId, T>,
}

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<T> {
    name: &'static str,
    inner: RwLock<Rows<T>>,
}

impl<T> InMemoryRecordStore<T> {
    /// `name` is used in error messages ("Lead 4 does not exist").
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(Rows {
                next_id: 0,
                rows: BTreeMap::new(),
            }),
        }
    }

    fn poisoned(&self) -> StoreError {
        StoreError::Unavailable(format!("{} store lock poisoned", self.name))
    }
}

impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let guard = self.inner.read().map_err(|_| self.poisoned())?;
        Ok(guard.rows.get(&id).cloned())
    }

    fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let mut guard = self.inner.write().map_err(|_| self.poisoned())?;
        guard.next_id += 1;
        let id = RecordId::new(guard.next_id);
        record.set_id(id);
        guard.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| self.poisoned())?;
        let id = *record.id();
        match guard.rows.get_mut(&id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::Missing {
                record: self.name,
                id,
            }),
        }
    }

    fn list(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.inner.read().map_err(|_| self.poisoned())?;
        Ok(guard.rows.values().cloned().collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use kosmos_core::{AuditFields, UserId, impl_record};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub(crate) struct Note {
        pub id: RecordId,
        pub title: String,
        pub audit: AuditFields,
    }

    impl_record!(Note);

    pub(crate) fn note(title: &str) -> Note {
        Note {
            id: RecordId::new(0),
            title: title.to_string(),
            audit: AuditFields::fill_common(UserId::new(1), Utc::now()),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = InMemoryRecordStore::new("Note");
        let a = store.insert(note("a")).unwrap();
        let b = store.insert(note("b")).unwrap();
        assert_eq!(a.id, RecordId::new(1));
        assert_eq!(b.id, RecordId::new(2));
        assert_eq!(store.get(RecordId::new(2)).unwrap().unwrap().title, "b");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn update_of_unknown_row_fails() {
        let store: InMemoryRecordStore<Note> = InMemoryRecordStore::new("Note");
        let mut ghost = note("ghost");
        ghost.id = RecordId::new(7);
        assert_eq!(
            store.update(ghost),
            Err(StoreError::Missing {
                record: "Note",
                id: RecordId::new(7)
            })
        );
    }
}
