//! All handlers for the invitation endpoints live in here

use actix_web::http::header::ContentType;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ingest::{ImageIngestor, OversizedFileWarning, SelectedFile};
use crate::invitation::{InvitationDraft, InvitationRecord};
use crate::render::TemplateRenderer;
use crate::repository::InvitationRepository;
use crate::server::handler::{ApiError, ApiErrorResponse, ApiResult, PathUuid};
use crate::store::Store;
use crate::theme::{ColorTheme, FontTheme};

/// The repository as it is shared between the workers
pub type Repository = Data<InvitationRepository<Store>>;

/// An image file attached to a new invitation
#[derive(Deserialize, ToSchema)]
pub struct ImageUpload {
    /// The original filename, used to derive the mime type
    #[schema(example = "cake.png")]
    name: String,
    /// The file content in standard base64.
    ///
    /// A data url prefix (`data:image/png;base64,`) is stripped.
    #[schema(example = "iVBORw0KGgo=")]
    data: String,
}

/// The content of a new invitation
///
/// `title`, `event_date_time`, `location` and `organizer` are required.
/// Empty theme names select the default theme.
#[derive(Deserialize, ToSchema)]
pub struct CreateInvitationRequest {
    #[serde(default)]
    #[schema(example = "Ana's 30th birthday")]
    title: String,
    #[serde(default)]
    #[schema(example = "2025-03-15T19:00")]
    event_date_time: String,
    #[serde(default)]
    #[schema(example = "Rua das Flores 42, São Paulo")]
    location: String,
    #[serde(default)]
    #[schema(example = "Bring your own cake")]
    description: String,
    #[serde(default)]
    #[schema(example = "Ana")]
    organizer: String,
    #[serde(default)]
    #[schema(example = "(11) 99999-8888")]
    whatsapp_number: String,
    #[serde(default)]
    #[schema(example = "purple")]
    color_theme: String,
    #[serde(default)]
    #[schema(example = "elegant")]
    font_theme: String,
    #[serde(default)]
    images: Vec<ImageUpload>,
}

/// An invitation as shown in the gallery
#[derive(Serialize, ToSchema)]
pub struct InvitationSummary {
    uuid: Uuid,
    #[schema(example = "Ana's 30th birthday")]
    title: String,
    event_date_time: NaiveDateTime,
    #[schema(example = "Rua das Flores 42, São Paulo")]
    location: String,
    #[schema(example = "Ana")]
    organizer: String,
    color_theme: ColorTheme,
    font_theme: FontTheme,
    #[schema(example = 2)]
    image_count: usize,
    #[schema(example = 1337)]
    view_count: u64,
    created_at: DateTime<Utc>,
    /// Path of the shareable rendered invitation
    #[schema(example = "/invitations/6f5c2a5e-1a7e-4b6b-9d0e-3f1f0f0c2d44")]
    share_path: String,
}

impl From<InvitationRecord> for InvitationSummary {
    fn from(value: InvitationRecord) -> Self {
        Self {
            share_path: format!("/invitations/{}", value.uuid),
            uuid: value.uuid,
            title: value.title,
            event_date_time: value.event_date_time,
            location: value.location,
            organizer: value.organizer,
            color_theme: value.color_theme,
            font_theme: value.font_theme,
            image_count: value.images.len(),
            view_count: value.view_count,
            created_at: DateTime::from_naive_utc_and_offset(value.created_at, Utc),
        }
    }
}

/// The created invitation and the images that were skipped
#[derive(Serialize, ToSchema)]
pub struct CreateInvitationResponse {
    invitation: InvitationSummary,
    /// One entry for each image that exceeded the size limit
    warnings: Vec<OversizedFileWarning>,
}

/// Create a new invitation
///
/// Images that exceed the size limit are skipped and reported in `warnings`,
/// the invitation is created with the remaining images.
#[utoipa::path(
    tag = "Invitations",
    context_path = "/api/v1",
    responses(
        (status = 200, description = "Invitation got created", body = CreateInvitationResponse),
        (status = 400, description = "Client error", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse),
    ),
    request_body = CreateInvitationRequest,
)]
#[post("/invitations")]
pub async fn create_invitation(
    req: Json<CreateInvitationRequest>,
    repository: Repository,
    ingestor: Data<ImageIngestor>,
) -> ApiResult<Json<CreateInvitationResponse>> {
    let req = req.into_inner();

    let files = req
        .images
        .into_iter()
        .map(|image| -> ApiResult<SelectedFile> {
            let encoded = match image.data.split_once(";base64,") {
                Some((_, encoded)) => encoded,
                None => image.data.as_str(),
            };
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|_| ApiError::InvalidImage(image.name.clone()))?;

            Ok(SelectedFile {
                name: image.name,
                bytes: Bytes::from(bytes),
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let report = ingestor.ingest(files).await;

    let draft = InvitationDraft {
        title: req.title,
        event_date_time: req.event_date_time,
        location: req.location,
        description: req.description,
        organizer: req.organizer,
        whatsapp_number: req.whatsapp_number,
        color_theme: req.color_theme,
        font_theme: req.font_theme,
        images: report.images.into_iter().map(|i| i.data_url).collect(),
    };

    let invitation = repository.create(&draft).await?;
    info!("Created invitation {}", invitation.uuid);

    Ok(Json(CreateInvitationResponse {
        invitation: invitation.into(),
        warnings: report.warnings,
    }))
}

/// All invitations
#[derive(Serialize, ToSchema)]
pub struct GetInvitationsResponse {
    invitations: Vec<InvitationSummary>,
}

/// Retrieve all invitations, the most recently created first
#[utoipa::path(
    tag = "Invitations",
    context_path = "/api/v1",
    responses(
        (status = 200, description = "All invitations", body = GetInvitationsResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse),
    ),
)]
#[get("/invitations")]
pub async fn get_invitations(repository: Repository) -> ApiResult<Json<GetInvitationsResponse>> {
    let invitations = repository.list().await?;

    Ok(Json(GetInvitationsResponse {
        invitations: invitations.into_iter().map(Into::into).collect(),
    }))
}

/// Retrieve a single invitation including its images
///
/// This does not count as a view.
#[utoipa::path(
    tag = "Invitations",
    context_path = "/api/v1",
    responses(
        (status = 200, description = "The requested invitation", body = InvitationRecord),
        (status = 404, description = "Unknown invitation", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse),
    ),
    params(PathUuid),
)]
#[get("/invitations/{uuid}")]
pub async fn get_invitation(
    path: Path<PathUuid>,
    repository: Repository,
) -> ApiResult<Json<InvitationRecord>> {
    Ok(Json(repository.fetch_one(path.uuid).await?))
}

/// Response header of the invitation page that reports whether the view was counted
pub const VIEW_COUNTED_HEADER: &str = "X-View-Counted";

/// The shareable invitation page
///
/// Renders the invitation as a standalone html document and counts the view.
/// The page is delivered even if the view could not be counted, the
/// `X-View-Counted` header tells whether it was.
#[utoipa::path(
    tag = "Invitations",
    responses(
        (
            status = 200,
            description = "The rendered invitation",
            body = String,
            content_type = "text/html",
            headers(
                ("X-View-Counted" = bool, description = "false if the view could not be counted"),
            ),
        ),
        (status = 404, description = "Unknown invitation", body = ApiErrorResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse),
    ),
    params(PathUuid),
)]
#[get("/invitations/{uuid}")]
pub async fn view_invitation(
    path: Path<PathUuid>,
    repository: Repository,
    renderer: Data<TemplateRenderer>,
) -> ApiResult<HttpResponse> {
    let invitation = repository.fetch_one(path.uuid).await?;
    let document = renderer.render(&invitation);

    let counted = match repository.increment_views(invitation.uuid).await {
        Ok(_) => true,
        Err(err) => {
            error!("Could not count view of {}: {err}", invitation.uuid);
            false
        }
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header((VIEW_COUNTED_HEADER, counted.to_string()))
        .body(document))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::web::scope;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::store::MemoryStore;

    macro_rules! app {
        ($repository:expr) => {
            test::init_service(
                App::new()
                    .app_data($repository.clone())
                    .app_data(Data::new(ImageIngestor::new(8)))
                    .app_data(Data::new(TemplateRenderer::default()))
                    .service(view_invitation)
                    .service(
                        scope("/api/v1")
                            .service(create_invitation)
                            .service(get_invitations)
                            .service(get_invitation),
                    ),
            )
            .await
        };
    }

    fn repository() -> Repository {
        Data::new(InvitationRepository::new(Store::Memory(MemoryStore::default())))
    }

    fn body() -> Value {
        json!({
            "title": "<b>Party</b>",
            "event_date_time": "2025-03-15T19:00",
            "location": "Rua das Flores 42",
            "organizer": "Ana",
            "whatsapp_number": "11999998888",
            "color_theme": "pink",
            "images": [
                {"name": "small.png", "data": "data:image/png;base64,aGVsbG8="},
                {"name": "large.png", "data": STANDARD.encode([0u8; 9])},
            ],
        })
    }

    #[actix_web::test]
    async fn create_list_and_view() {
        let repository = repository();
        let app = app!(repository);

        let req = test::TestRequest::post()
            .uri("/api/v1/invitations")
            .set_json(body())
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(created["warnings"][0]["name"], "large.png");
        assert_eq!(created["invitation"]["image_count"], 1);
        assert_eq!(created["invitation"]["color_theme"], "pink");
        assert_eq!(created["invitation"]["view_count"], 0);
        let share_path = created["invitation"]["share_path"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&share_path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(VIEW_COUNTED_HEADER).unwrap(), "true");
        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("&lt;b&gt;Party&lt;/b&gt;"));
        assert!(html.contains("data:image/png;base64,aGVsbG8="));

        let req = test::TestRequest::get()
            .uri("/api/v1/invitations")
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["invitations"].as_array().unwrap().len(), 1);
        assert_eq!(listed["invitations"][0]["view_count"], 1);
    }

    #[actix_web::test]
    async fn invalid_drafts_are_rejected() {
        let repository = repository();
        let app = app!(repository);

        let mut draft = body();
        draft["organizer"] = json!("");
        let req = test::TestRequest::post()
            .uri("/api/v1/invitations")
            .set_json(draft)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut draft = body();
        draft["images"] = json!([{"name": "broken.png", "data": "***"}]);
        let req = test::TestRequest::post()
            .uri("/api/v1/invitations")
            .set_json(draft)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut draft = body();
        draft["title"] = json!("a".repeat(300));
        let req = test::TestRequest::post()
            .uri("/api/v1/invitations")
            .set_json(draft)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["status_code"], 1001);

        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn unknown_invitation() {
        let repository = repository();
        let app = app!(repository);

        for uri in [
            format!("/invitations/{}", Uuid::new_v4()),
            format!("/api/v1/invitations/{}", Uuid::new_v4()),
        ] {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }
}
