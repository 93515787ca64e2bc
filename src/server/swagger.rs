//! This module holds the definition of the swagger declaration

use utoipa::OpenApi;

use crate::ingest::OversizedFileWarning;
use crate::invitation::InvitationRecord;
use crate::server::handler;
use crate::theme::{ColorTheme, FontTheme};

/// Helper struct for the openapi definitions.
#[derive(OpenApi)]
#[openapi(
    paths(
        handler::create_invitation,
        handler::get_invitations,
        handler::get_invitation,
        handler::view_invitation,
        handler::health,
        handler::version,
    ),
    components(schemas(
        handler::ApiErrorResponse,
        handler::ApiStatusCode,
        handler::CreateInvitationRequest,
        handler::ImageUpload,
        handler::CreateInvitationResponse,
        handler::InvitationSummary,
        handler::GetInvitationsResponse,
        handler::HealthResponse,
        handler::VersionResponse,
        InvitationRecord,
        OversizedFileWarning,
        ColorTheme,
        FontTheme,
    ))
)]
pub struct ApiDoc;
