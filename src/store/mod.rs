//! The boundary to the persistence layer.
//!
//! The engine needs only a handful of operations from its store, they are
//! collected in [DataStore]. [Store] selects one of the implementations at runtime.

use std::fmt::{Display, Formatter};

use uuid::Uuid;

pub use crate::store::database::DatabaseStore;
pub use crate::store::memory::MemoryStore;
use crate::invitation::{InvitationRecord, NewInvitation};

mod database;
mod memory;

/// The operations the engine requires from a store of invitations
#[allow(async_fn_in_trait)]
pub trait DataStore {
    /// Insert a new invitation.
    ///
    /// The store assigns `uuid` and `created_at`, `view_count` starts at 0.
    async fn insert(&self, invitation: NewInvitation) -> Result<InvitationRecord, StoreError>;

    /// Retrieve all invitations, the most recently created first
    async fn select_all_newest_first(&self) -> Result<Vec<InvitationRecord>, StoreError>;

    /// Retrieve a single invitation
    async fn select_by_id(&self, uuid: Uuid) -> Result<Option<InvitationRecord>, StoreError>;

    /// Set the view count of an invitation to `new` if it is still `expected`.
    ///
    /// Returns whether the value was written.
    async fn compare_and_set_views(
        &self,
        uuid: Uuid,
        expected: u64,
        new: u64,
    ) -> Result<bool, StoreError>;

    /// The number of stored invitations
    async fn count(&self) -> Result<u64, StoreError>;
}

/// The store configured for this process
#[derive(Clone)]
pub enum Store {
    /// Persistent store backed by the database
    Database(DatabaseStore),
    /// Process-local store that is lost on exit
    Memory(MemoryStore),
}

impl DataStore for Store {
    async fn insert(&self, invitation: NewInvitation) -> Result<InvitationRecord, StoreError> {
        match self {
            Store::Database(store) => store.insert(invitation).await,
            Store::Memory(store) => store.insert(invitation).await,
        }
    }

    async fn select_all_newest_first(&self) -> Result<Vec<InvitationRecord>, StoreError> {
        match self {
            Store::Database(store) => store.select_all_newest_first().await,
            Store::Memory(store) => store.select_all_newest_first().await,
        }
    }

    async fn select_by_id(&self, uuid: Uuid) -> Result<Option<InvitationRecord>, StoreError> {
        match self {
            Store::Database(store) => store.select_by_id(uuid).await,
            Store::Memory(store) => store.select_by_id(uuid).await,
        }
    }

    async fn compare_and_set_views(
        &self,
        uuid: Uuid,
        expected: u64,
        new: u64,
    ) -> Result<bool, StoreError> {
        match self {
            Store::Database(store) => store.compare_and_set_views(uuid, expected, new).await,
            Store::Memory(store) => store.compare_and_set_views(uuid, expected, new).await,
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        match self {
            Store::Database(store) => store.count().await,
            Store::Memory(store) => store.count().await,
        }
    }
}

/// Errors of the underlying persistence layer
#[derive(Debug)]
pub enum StoreError {
    /// Error returned by the database
    Database(rorm::Error),
    /// A stored row could not be converted into a record
    CorruptRecord(String),
    /// The store refuses to accept more data
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::CorruptRecord(reason) => write!(f, "Corrupt record: {reason}"),
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rorm::Error> for StoreError {
    fn from(value: rorm::Error) -> Self {
        Self::Database(value)
    }
}
