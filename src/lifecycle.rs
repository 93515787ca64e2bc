//! The organizer's workflow: filling a draft, selecting images, submitting,
//! browsing the gallery and opening single invitations.
//!
//! All state lives in one [AppState] value that only changes through [reduce].
//! The [LifecycleController] runs the asynchronous flows and feeds their results
//! back as [Action]s.

use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingest::{ImageIngestor, IngestReport, SelectedFile, Selection};
use crate::invitation::{InvitationDraft, InvitationRecord};
use crate::render::TemplateRenderer;
use crate::repository::InvitationRepository;
use crate::store::DataStore;

/// How long a notice stays visible
pub const NOTICE_TTL_SECONDS: i64 = 5;

/// The form fields of a draft
#[allow(missing_docs)]
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Field {
    Title,
    EventDateTime,
    Location,
    Description,
    Organizer,
    WhatsappNumber,
    ColorTheme,
    FontTheme,
}

/// The screen the organizer is looking at
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum View {
    /// The draft form
    #[default]
    Create,
    /// The gallery of all invitations
    Listing,
    /// A single rendered invitation
    Viewing(Uuid),
}

/// The kind of a notice
#[allow(missing_docs)]
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// A transient message for the organizer
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    /// Kind of the message
    pub kind: NoticeKind,
    /// Human readable text
    pub text: String,
    /// When the notice was shown
    pub shown_at: DateTime<Utc>,
}

impl Notice {
    /// A notice that becomes visible at `shown_at`
    pub fn new(kind: NoticeKind, text: impl Into<String>, shown_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at,
        }
    }

    /// Whether the notice should no longer be shown at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.shown_at >= Duration::seconds(NOTICE_TTL_SECONDS)
    }
}

/// The complete state of an organizer's session
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct AppState {
    /// Values of the form fields
    pub form: InvitationDraft,
    /// Images selected for the draft
    pub selection: Selection,
    /// Changes every time the draft is reset.
    ///
    /// Ingestion results that started for an older generation are dropped.
    pub selection_generation: u64,
    /// The active screen
    pub view: View,
    /// The gallery, as last loaded
    pub invitations: Vec<InvitationRecord>,
    /// The currently visible notice
    pub notice: Option<Notice>,
    /// Whether a submission is in progress
    pub busy: bool,
}

impl AppState {
    /// The draft as it would be submitted now
    pub fn draft(&self) -> InvitationDraft {
        InvitationDraft {
            images: self.selection.data_urls(),
            ..self.form.clone()
        }
    }
}

/// Everything that can happen to an [AppState]
#[derive(Clone, Debug)]
pub enum Action {
    /// A form field was edited
    EditField(Field, String),
    /// An ingestion batch finished
    ImagesIngested {
        /// The generation the batch was started for
        generation: u64,
        /// Result of the batch
        report: IngestReport,
        /// When the batch finished
        at: DateTime<Utc>,
    },
    /// The organizer removed the image at this position
    RemoveImage(usize),
    /// The draft was stored at the given time
    Submitted(InvitationRecord, DateTime<Utc>),
    /// The gallery was loaded
    Listed(Vec<InvitationRecord>),
    /// A single invitation is displayed
    Opened(Uuid),
    /// Show a notice, flows report their failures this way
    Notify(Notice),
    /// Hide the notice
    DismissNotice,
    /// Time passed, expired notices are hidden
    Tick(DateTime<Utc>),
    /// Switch the active screen
    SwitchView(View),
    /// A submission started or ended
    Busy(bool),
}

/// Apply an action to a state
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::EditField(field, value) => {
            let form = &mut state.form;
            let target = match field {
                Field::Title => &mut form.title,
                Field::EventDateTime => &mut form.event_date_time,
                Field::Location => &mut form.location,
                Field::Description => &mut form.description,
                Field::Organizer => &mut form.organizer,
                Field::WhatsappNumber => &mut form.whatsapp_number,
                Field::ColorTheme => &mut form.color_theme,
                Field::FontTheme => &mut form.font_theme,
            };
            *target = value;
        }
        Action::ImagesIngested {
            generation,
            report,
            at,
        } => {
            if generation != state.selection_generation {
                return state;
            }
            state.selection.extend(report.images);
            if !report.warnings.is_empty() {
                let text = report
                    .warnings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                state.notice = Some(Notice::new(NoticeKind::Warning, text, at));
            }
        }
        Action::RemoveImage(index) => {
            state.selection.remove(index);
        }
        Action::Submitted(record, at) => {
            state.form = InvitationDraft::default();
            state.selection.clear();
            state.selection_generation += 1;
            state.view = View::Listing;
            state.notice = Some(Notice::new(
                NoticeKind::Success,
                format!("Invitation {} created", record.title),
                at,
            ));
        }
        Action::Listed(invitations) => state.invitations = invitations,
        Action::Opened(uuid) => state.view = View::Viewing(uuid),
        Action::Notify(notice) => state.notice = Some(notice),
        Action::DismissNotice => state.notice = None,
        Action::Tick(now) => {
            if state.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
                state.notice = None;
            }
        }
        Action::SwitchView(view) => state.view = view,
        Action::Busy(busy) => state.busy = busy,
    }
    state
}

/// Drives the organizer's flows against a store
pub struct LifecycleController<S> {
    repository: InvitationRepository<S>,
    ingestor: ImageIngestor,
    renderer: TemplateRenderer,
    state: AppState,
}

impl<S: DataStore> LifecycleController<S> {
    /// Create a controller with an empty state
    pub fn new(
        repository: InvitationRepository<S>,
        ingestor: ImageIngestor,
        renderer: TemplateRenderer,
    ) -> Self {
        Self {
            repository,
            ingestor,
            renderer,
            state: AppState::default(),
        }
    }

    /// The current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action to the current state
    pub fn dispatch(&mut self, action: Action) {
        let previous = self.state.notice.clone();
        self.state = reduce(std::mem::take(&mut self.state), action);

        if let Some(notice) = self.state.notice.as_ref().filter(|n| Some(*n) != previous.as_ref()) {
            match notice.kind {
                NoticeKind::Success => info!("{}", notice.text),
                NoticeKind::Warning => warn!("{}", notice.text),
                NoticeKind::Error => error!("{}", notice.text),
            }
        }
    }

    /// Ingest files and add them to the selection of the current draft
    pub async fn select_files(&mut self, files: Vec<SelectedFile>) {
        let generation = self.state.selection_generation;
        let report = self.ingestor.ingest(files).await;
        self.dispatch(Action::ImagesIngested {
            generation,
            report,
            at: Utc::now(),
        });
    }

    fn fail(&mut self, text: String) {
        self.dispatch(Action::Notify(Notice::new(
            NoticeKind::Error,
            text,
            Utc::now(),
        )));
    }

    /// Submit the current draft.
    ///
    /// On success the draft is cleared and the gallery is shown and reloaded.
    /// Returns the stored invitation.
    pub async fn submit(&mut self) -> Option<InvitationRecord> {
        self.dispatch(Action::DismissNotice);
        self.dispatch(Action::Busy(true));
        let result = self.repository.create(&self.state.draft()).await;
        self.dispatch(Action::Busy(false));

        match result {
            Ok(record) => {
                self.dispatch(Action::Submitted(record.clone(), Utc::now()));
                self.refresh().await;
                Some(record)
            }
            Err(err) => {
                self.fail(format!("Could not create invitation: {err}"));
                None
            }
        }
    }

    /// Reload the gallery
    pub async fn refresh(&mut self) {
        match self.repository.list().await {
            Ok(invitations) => self.dispatch(Action::Listed(invitations)),
            Err(err) => self.fail(format!("Could not load invitations: {err}")),
        }
    }

    /// Open an invitation.
    ///
    /// Returns the rendered document, counts the view and reloads the gallery.
    pub async fn open(&mut self, uuid: Uuid) -> Option<String> {
        self.dispatch(Action::DismissNotice);
        let invitation = match self.repository.fetch_one(uuid).await {
            Ok(invitation) => invitation,
            Err(err) => {
                self.fail(format!("Could not open invitation: {err}"));
                return None;
            }
        };

        let document = self.renderer.render(&invitation);
        self.dispatch(Action::Opened(uuid));

        if let Err(err) = self.repository.increment_views(uuid).await {
            self.fail(format!("Could not count view: {err}"));
            return Some(document);
        }

        self.refresh().await;
        Some(document)
    }
}
