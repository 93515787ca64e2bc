//! Create, list, fetch and count views of invitations

use std::fmt::{Display, Formatter};

use log::{debug, warn};
use uuid::Uuid;

use crate::invitation::{InvitationDraft, InvitationRecord, ValidationError};
use crate::store::{DataStore, StoreError};

/// Default number of attempts to increment a view count under contention
pub const DEFAULT_MAX_VIEW_RETRIES: u32 = 16;

/// Access to the stored invitations
#[derive(Clone)]
pub struct InvitationRepository<S> {
    store: S,
    max_view_retries: u32,
}

impl<S: DataStore> InvitationRepository<S> {
    /// Create a repository on top of a store
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_view_retries: DEFAULT_MAX_VIEW_RETRIES,
        }
    }

    /// Set how often an increment is retried when other viewers race for the same counter
    pub fn with_max_view_retries(mut self, max_view_retries: u32) -> Self {
        self.max_view_retries = max_view_retries.max(1);
        self
    }

    /// Validate and store a draft.
    ///
    /// The store is not touched if the draft is invalid.
    pub async fn create(&self, draft: &InvitationDraft) -> Result<InvitationRecord, RepositoryError> {
        let new = draft.validate()?;
        let record = self.store.insert(new).await?;

        debug!("Created invitation {}", record.uuid);

        Ok(record)
    }

    /// All invitations, most recently created first
    pub async fn list(&self) -> Result<Vec<InvitationRecord>, RepositoryError> {
        Ok(self.store.select_all_newest_first().await?)
    }

    /// A single invitation
    pub async fn fetch_one(&self, uuid: Uuid) -> Result<InvitationRecord, RepositoryError> {
        self.store
            .select_by_id(uuid)
            .await?
            .ok_or(RepositoryError::NotFound(uuid))
    }

    /// Count one view of an invitation and return the new count.
    ///
    /// Reads the current value and writes it back incremented only if nobody else
    /// changed it in between, retrying otherwise.
    pub async fn increment_views(&self, uuid: Uuid) -> Result<u64, RepositoryError> {
        for attempt in 1..=self.max_view_retries {
            let current = self.fetch_one(uuid).await?.view_count;
            let new = current + 1;

            if self.store.compare_and_set_views(uuid, current, new).await? {
                return Ok(new);
            }

            debug!("View count of {uuid} changed concurrently, attempt {attempt}");
            tokio::task::yield_now().await;
        }

        warn!(
            "Giving up incrementing view count of {uuid} after {} attempts",
            self.max_view_retries
        );
        Err(RepositoryError::Contention(uuid))
    }

    /// The number of stored invitations
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.count().await?)
    }
}

/// Errors of the [InvitationRepository]
#[derive(Debug)]
pub enum RepositoryError {
    /// The draft was rejected before contacting the store
    Validation(ValidationError),
    /// No invitation with this uuid exists
    NotFound(Uuid),
    /// The underlying store failed
    Store(StoreError),
    /// The view count kept changing while trying to increment it
    Contention(Uuid),
}

impl Display for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::Validation(err) => write!(f, "{err}"),
            RepositoryError::NotFound(uuid) => write!(f, "Invitation {uuid} not found"),
            RepositoryError::Store(err) => write!(f, "{err}"),
            RepositoryError::Contention(uuid) => {
                write!(f, "Could not count view of invitation {uuid}, try again")
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<ValidationError> for RepositoryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepositoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::join_all;

    use super::*;
    use crate::invitation::tests::draft;
    use crate::invitation::NewInvitation;
    use crate::store::MemoryStore;

    /// Hands control back to the runtime between reading and writing a view count
    /// and optionally refuses every write
    #[derive(Default)]
    struct InterleavingStore {
        inner: MemoryStore,
        refuse_writes: bool,
        failed_writes: AtomicUsize,
    }

    impl DataStore for InterleavingStore {
        async fn insert(&self, invitation: NewInvitation) -> Result<InvitationRecord, StoreError> {
            self.inner.insert(invitation).await
        }

        async fn select_all_newest_first(&self) -> Result<Vec<InvitationRecord>, StoreError> {
            self.inner.select_all_newest_first().await
        }

        async fn select_by_id(&self, uuid: Uuid) -> Result<Option<InvitationRecord>, StoreError> {
            let record = self.inner.select_by_id(uuid).await;
            tokio::task::yield_now().await;
            record
        }

        async fn compare_and_set_views(
            &self,
            uuid: Uuid,
            expected: u64,
            new: u64,
        ) -> Result<bool, StoreError> {
            let written = !self.refuse_writes
                && self.inner.compare_and_set_views(uuid, expected, new).await?;
            if !written {
                self.failed_writes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(written)
        }

        async fn count(&self) -> Result<u64, StoreError> {
            self.inner.count().await
        }
    }

    fn repository() -> InvitationRepository<MemoryStore> {
        InvitationRepository::new(MemoryStore::default())
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let repo = repository();
        let d = draft();

        let created = repo.create(&d).await.unwrap();
        let fetched = repo.fetch_one(created.uuid).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.view_count, 0);

        let expected = d.validate().unwrap();
        assert_eq!(fetched.title, expected.title);
        assert_eq!(fetched.event_date_time, expected.event_date_time);
        assert_eq!(fetched.location, expected.location);
        assert_eq!(fetched.description, expected.description);
        assert_eq!(fetched.organizer, expected.organizer);
        assert_eq!(fetched.whatsapp_number, expected.whatsapp_number);
        assert_eq!(fetched.color_theme, expected.color_theme);
        assert_eq!(fetched.font_theme, expected.font_theme);
        assert_eq!(fetched.images, expected.images);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let repo = repository();
        let mut d = draft();
        d.organizer.clear();

        assert!(matches!(
            repo.create(&d).await,
            Err(RepositoryError::Validation(ValidationError::MissingField(
                "organizer"
            )))
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = repository();
        assert!(repo.list().await.unwrap().is_empty());

        let mut uuids = Vec::new();
        for title in ["first", "second", "third"] {
            let mut d = draft();
            d.title = title.to_string();
            uuids.push(repo.create(&d).await.unwrap().uuid);
        }

        let listed = repo.list().await.unwrap();
        let listed_uuids: Vec<_> = listed.iter().map(|r| r.uuid).collect();
        uuids.reverse();
        assert_eq!(listed_uuids, uuids);
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn fetch_unknown_is_not_found() {
        let uuid = Uuid::new_v4();
        assert!(matches!(
            repository().fetch_one(uuid).await,
            Err(RepositoryError::NotFound(u)) if u == uuid
        ));
        assert!(matches!(
            repository().increment_views(uuid).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn sequential_increments() {
        let repo = repository();
        let uuid = repo.create(&draft()).await.unwrap().uuid;

        for expected in 1..=5 {
            assert_eq!(repo.increment_views(uuid).await.unwrap(), expected);
        }
        assert_eq!(repo.fetch_one(uuid).await.unwrap().view_count, 5);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let repo = repository().with_max_view_retries(64);
        let uuid = repo.create(&draft()).await.unwrap().uuid;

        let results = join_all((0..20).map(|_| repo.increment_views(uuid))).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(repo.fetch_one(uuid).await.unwrap().view_count, 20);
    }

    #[tokio::test]
    async fn interleaved_increments_retry_and_are_not_lost() {
        let repo =
            InvitationRepository::new(InterleavingStore::default()).with_max_view_retries(64);
        let uuid = repo.create(&draft()).await.unwrap().uuid;

        let results = join_all((0..20).map(|_| repo.increment_views(uuid))).await;

        assert!(results.iter().all(Result::is_ok));
        assert!(repo.store.failed_writes.load(Ordering::SeqCst) > 0);
        assert_eq!(repo.fetch_one(uuid).await.unwrap().view_count, 20);

        let mut counts: Vec<u64> = results.into_iter().map(Result::unwrap).collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn increment_gives_up_after_max_attempts() {
        let store = InterleavingStore {
            refuse_writes: true,
            ..Default::default()
        };
        let repo = InvitationRepository::new(store).with_max_view_retries(3);
        let uuid = repo.create(&draft()).await.unwrap().uuid;

        assert!(matches!(
            repo.increment_views(uuid).await,
            Err(RepositoryError::Contention(u)) if u == uuid
        ));
        assert_eq!(repo.store.failed_writes.load(Ordering::SeqCst), 3);
        assert_eq!(repo.fetch_one(uuid).await.unwrap().view_count, 0);
    }

    #[tokio::test]
    async fn store_failures_are_reported() {
        let repo = InvitationRepository::new(MemoryStore::new(Some(0)));

        assert!(matches!(
            repo.create(&draft()).await,
            Err(RepositoryError::Store(StoreError::Unavailable(_)))
        ));
    }
}
