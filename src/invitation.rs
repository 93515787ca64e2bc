//! The invitation data model: drafts as they are typed into a form, the
//! validated value handed to a store and the persisted record.

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::theme::{ColorTheme, FontTheme, UnknownThemeError};

/// Accepted input formats for the event date and time
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Longest accepted title, location and organizer in characters
pub const MAX_NAME_LENGTH: usize = 255;
/// Longest accepted description in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;
/// Most digits accepted in a phone number
pub const MAX_WHATSAPP_NUMBER_LENGTH: usize = 32;

/// A persisted invitation
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, Eq, PartialEq)]
pub struct InvitationRecord {
    /// Assigned by the store
    pub uuid: Uuid,
    #[schema(example = "Ana's 30th birthday")]
    pub title: String,
    pub event_date_time: NaiveDateTime,
    #[schema(example = "Rua das Flores 42, São Paulo")]
    pub location: String,
    /// Empty if the organizer did not provide one
    pub description: String,
    #[schema(example = "Ana")]
    pub organizer: String,
    /// Digits only, empty if no RSVP link should be offered
    #[schema(example = "11999998888")]
    pub whatsapp_number: String,
    pub color_theme: ColorTheme,
    pub font_theme: FontTheme,
    /// Inline data urls in selection order
    pub images: Vec<String>,
    pub view_count: u64,
    /// Assigned by the store, in UTC
    pub created_at: NaiveDateTime,
}

/// A validated invitation that has not been stored yet
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewInvitation {
    pub title: String,
    pub event_date_time: NaiveDateTime,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub whatsapp_number: String,
    pub color_theme: ColorTheme,
    pub font_theme: FontTheme,
    pub images: Vec<String>,
}

impl NewInvitation {
    /// Turn this into the record a store returns
    pub(crate) fn into_record(self, uuid: Uuid, created_at: NaiveDateTime) -> InvitationRecord {
        InvitationRecord {
            uuid,
            title: self.title,
            event_date_time: self.event_date_time,
            location: self.location,
            description: self.description,
            organizer: self.organizer,
            whatsapp_number: self.whatsapp_number,
            color_theme: self.color_theme,
            font_theme: self.font_theme,
            images: self.images,
            view_count: 0,
            created_at,
        }
    }
}

/// The invitation as it is entered by an organizer
///
/// All fields are kept as text, exactly as a form submits them.
/// Empty theme fields select the default theme.
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct InvitationDraft {
    pub title: String,
    pub event_date_time: String,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub whatsapp_number: String,
    pub color_theme: String,
    pub font_theme: String,
    /// Already ingested images as data urls
    pub images: Vec<String>,
}

impl InvitationDraft {
    /// Check all required fields and convert the draft into a typed [NewInvitation]
    pub fn validate(&self) -> Result<NewInvitation, ValidationError> {
        let title = required("title", &self.title)?;
        let event_date_time = required("event_date_time", &self.event_date_time)?;
        let location = required("location", &self.location)?;
        let organizer = required("organizer", &self.organizer)?;
        let description = self.description.trim();

        at_most("title", title, MAX_NAME_LENGTH)?;
        at_most("location", location, MAX_NAME_LENGTH)?;
        at_most("organizer", organizer, MAX_NAME_LENGTH)?;
        at_most("description", description, MAX_DESCRIPTION_LENGTH)?;

        let event_date_time = parse_event_date_time(event_date_time)?;

        let whatsapp_number = normalize_whatsapp_number(&self.whatsapp_number);
        if whatsapp_number.is_empty() && !self.whatsapp_number.trim().is_empty() {
            return Err(ValidationError::InvalidWhatsappNumber(
                self.whatsapp_number.clone(),
            ));
        }
        at_most("whatsapp_number", &whatsapp_number, MAX_WHATSAPP_NUMBER_LENGTH)?;

        let color_theme = if self.color_theme.trim().is_empty() {
            ColorTheme::default()
        } else {
            self.color_theme.parse()?
        };
        let font_theme = if self.font_theme.trim().is_empty() {
            FontTheme::default()
        } else {
            self.font_theme.parse()?
        };

        Ok(NewInvitation {
            title: title.to_string(),
            event_date_time,
            location: location.to_string(),
            description: description.to_string(),
            organizer: organizer.to_string(),
            whatsapp_number,
            color_theme,
            font_theme,
            images: self.images.clone(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong(field, max));
    }
    Ok(())
}

/// Parse the date and time of an event as entered in a `datetime-local` input
pub fn parse_event_date_time(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = value.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ValidationError::InvalidDateTime(value.to_string()))
}

/// Strip everything but digits from a phone number
pub fn normalize_whatsapp_number(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// The reasons a draft can be rejected
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    /// A required field is empty
    MissingField(&'static str),
    /// A field exceeds its maximum number of characters
    TooLong(&'static str, usize),
    /// The event date could not be parsed
    InvalidDateTime(String),
    /// A phone number was given that contains no digits
    InvalidWhatsappNumber(String),
    /// The draft references a theme that is not in the catalog
    UnknownTheme(UnknownThemeError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ValidationError::TooLong(field, max) => {
                write!(f, "Field {field} must not be longer than {max} characters")
            }
            ValidationError::InvalidDateTime(value) => {
                write!(f, "Invalid event date and time: {value}")
            }
            ValidationError::InvalidWhatsappNumber(value) => {
                write!(f, "Invalid WhatsApp number: {value}")
            }
            ValidationError::UnknownTheme(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<UnknownThemeError> for ValidationError {
    fn from(value: UnknownThemeError) -> Self {
        Self::UnknownTheme(value)
    }
}
