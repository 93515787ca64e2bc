use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use itertools::Itertools;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::invitation::{InvitationRecord, NewInvitation};
use crate::store::{DataStore, StoreError};

#[derive(Default)]
struct Rows {
    /// Insertion sequence number and record
    rows: HashMap<Uuid, (u64, InvitationRecord)>,
    next_seq: u64,
}

/// A process-local store.
///
/// Used when no database is configured. All data is lost on exit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Rows>>,
    limit: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store that holds at most `limit` invitations
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            inner: Arc::default(),
            limit,
        }
    }
}

impl DataStore for MemoryStore {
    async fn insert(&self, invitation: NewInvitation) -> Result<InvitationRecord, StoreError> {
        let mut guard = self.inner.lock().await;

        if let Some(limit) = self.limit {
            if guard.rows.len() >= limit {
                return Err(StoreError::Unavailable(format!(
                    "memory store is full ({limit} invitations)"
                )));
            }
        }

        let record = invitation.into_record(Uuid::new_v4(), Utc::now().naive_utc());

        let seq = guard.next_seq;
        guard.next_seq += 1;
        guard.rows.insert(record.uuid, (seq, record.clone()));

        Ok(record)
    }

    async fn select_all_newest_first(&self) -> Result<Vec<InvitationRecord>, StoreError> {
        let guard = self.inner.lock().await;

        // Records created within the same clock tick are ordered by insertion
        Ok(guard
            .rows
            .values()
            .sorted_by(|(a_seq, a), (b_seq, b)| {
                (b.created_at, b_seq).cmp(&(a.created_at, a_seq))
            })
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn select_by_id(&self, uuid: Uuid) -> Result<Option<InvitationRecord>, StoreError> {
        let guard = self.inner.lock().await;
        Ok(guard.rows.get(&uuid).map(|(_, record)| record.clone()))
    }

    async fn compare_and_set_views(
        &self,
        uuid: Uuid,
        expected: u64,
        new: u64,
    ) -> Result<bool, StoreError> {
        let mut guard = self.inner.lock().await;

        match guard.rows.get_mut(&uuid) {
            Some((_, record)) if record.view_count == expected => {
                record.view_count = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().await.rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::tests::draft;

    #[tokio::test]
    async fn insert_assigns_identity() {
        let store = MemoryStore::default();
        let new = draft().validate().unwrap();

        let record = store.insert(new.clone()).await.unwrap();
        assert_eq!(record.view_count, 0);
        assert_eq!(record.title, new.title);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store.select_by_id(record.uuid).await.unwrap(),
            Some(record)
        );
    }

    #[tokio::test]
    async fn compare_and_set_rejects_stale_values() {
        let store = MemoryStore::default();
        let record = store.insert(draft().validate().unwrap()).await.unwrap();

        assert!(store.compare_and_set_views(record.uuid, 0, 1).await.unwrap());
        assert!(!store.compare_and_set_views(record.uuid, 0, 1).await.unwrap());
        assert!(!store
            .compare_and_set_views(Uuid::new_v4(), 0, 1)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn limit_is_enforced() {
        let store = MemoryStore::new(Some(1));
        store.insert(draft().validate().unwrap()).await.unwrap();

        assert!(matches!(
            store.insert(draft().validate().unwrap()).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
