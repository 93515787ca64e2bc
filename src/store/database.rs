use rorm::fields::types::Json;
use rorm::{and, insert, query, update, Database, FieldAccess, Model};
use uuid::Uuid;

use crate::invitation::{InvitationRecord, NewInvitation};
use crate::models::{Invitation, InvitationInsert};
use crate::store::{DataStore, StoreError};

/// The store backed by the database
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    /// Wrap an established database connection
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl DataStore for DatabaseStore {
    async fn insert(&self, invitation: NewInvitation) -> Result<InvitationRecord, StoreError> {
        let invitation = insert!(&self.db, InvitationInsert)
            .single(&InvitationInsert {
                uuid: Uuid::new_v4(),
                title: invitation.title,
                event_date_time: invitation.event_date_time,
                location: invitation.location,
                description: invitation.description,
                organizer: invitation.organizer,
                whatsapp_number: invitation.whatsapp_number,
                color_theme: invitation.color_theme,
                font_theme: invitation.font_theme,
                images: Json(invitation.images),
                view_count: 0,
            })
            .await?;

        to_record(invitation)
    }

    async fn select_all_newest_first(&self) -> Result<Vec<InvitationRecord>, StoreError> {
        query!(&self.db, Invitation)
            .order_desc(Invitation::F.created_at)
            .all()
            .await?
            .into_iter()
            .map(to_record)
            .collect()
    }

    async fn select_by_id(&self, uuid: Uuid) -> Result<Option<InvitationRecord>, StoreError> {
        query!(&self.db, Invitation)
            .condition(Invitation::F.uuid.equals(uuid))
            .optional()
            .await?
            .map(to_record)
            .transpose()
    }

    async fn compare_and_set_views(
        &self,
        uuid: Uuid,
        expected: u64,
        new: u64,
    ) -> Result<bool, StoreError> {
        let expected = to_db_count(expected)?;
        let new = to_db_count(new)?;

        let updated = update!(&self.db, Invitation)
            .condition(and!(
                Invitation::F.uuid.equals(uuid),
                Invitation::F.view_count.equals(expected)
            ))
            .set(Invitation::F.view_count, new)
            .exec()
            .await?;

        Ok(updated > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,) = query!(&self.db, (Invitation::F.uuid.count(),))
            .one()
            .await?;

        Ok(count as u64)
    }
}

fn to_db_count(count: u64) -> Result<i64, StoreError> {
    i64::try_from(count)
        .map_err(|_| StoreError::CorruptRecord(format!("view count {count} out of range")))
}

fn to_record(invitation: Invitation) -> Result<InvitationRecord, StoreError> {
    let view_count = u64::try_from(invitation.view_count).map_err(|_| {
        StoreError::CorruptRecord(format!(
            "negative view count for invitation {}",
            invitation.uuid
        ))
    })?;

    Ok(InvitationRecord {
        uuid: invitation.uuid,
        title: invitation.title,
        event_date_time: invitation.event_date_time,
        location: invitation.location,
        description: invitation.description,
        organizer: invitation.organizer,
        whatsapp_number: invitation.whatsapp_number,
        color_theme: invitation.color_theme,
        font_theme: invitation.font_theme,
        images: invitation.images.0,
        view_count,
        created_at: invitation.created_at,
    })
}
