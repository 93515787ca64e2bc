use rorm::fields::types::Json;
use rorm::{Model, Patch};
use uuid::Uuid;

use crate::theme::{ColorTheme, FontTheme};

/// A themed event invitation.
///
/// Rows are never updated except for `view_count`.
/// The column lengths mirror the limits in [crate::invitation] that drafts are validated against.
#[derive(Model)]
pub struct Invitation {
    /// The primary key of an invitation
    #[rorm(primary_key)]
    pub uuid: Uuid,

    /// The name of the event
    #[rorm(max_length = 255)]
    pub title: String,

    /// The point in time the event takes place
    pub event_date_time: chrono::NaiveDateTime,

    /// Where the event takes place
    #[rorm(max_length = 255)]
    pub location: String,

    /// Free text, empty if not provided
    #[rorm(max_length = 4096)]
    pub description: String,

    /// The name of the organizer
    #[rorm(max_length = 255)]
    pub organizer: String,

    /// Digits of the phone number to send RSVPs to
    #[rorm(max_length = 32)]
    pub whatsapp_number: String,

    /// The background color scheme
    pub color_theme: ColorTheme,

    /// The typeface family
    pub font_theme: FontTheme,

    /// Inline data urls in selection order
    pub images: Json<Vec<String>>,

    /// How often the rendered invitation was opened
    #[rorm(default = 0)]
    pub view_count: i64,

    /// The point in time the invitation was created
    #[rorm(auto_create_time)]
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Patch)]
#[rorm(model = "Invitation")]
pub(crate) struct InvitationInsert {
    pub(crate) uuid: Uuid,
    pub(crate) title: String,
    pub(crate) event_date_time: chrono::NaiveDateTime,
    pub(crate) location: String,
    pub(crate) description: String,
    pub(crate) organizer: String,
    pub(crate) whatsapp_number: String,
    pub(crate) color_theme: ColorTheme,
    pub(crate) font_theme: FontTheme,
    pub(crate) images: Json<Vec<String>>,
    pub(crate) view_count: i64,
}
