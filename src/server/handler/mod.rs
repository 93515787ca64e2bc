//! This module holds the handler of invitare

use std::fmt::{Display, Formatter};

use actix_web::body::BoxBody;
use actix_web::error::JsonPayloadError;
use actix_web::HttpResponse;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_repr::Serialize_repr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub use crate::server::handler::health::*;
pub use crate::server::handler::invitations::*;
pub use crate::server::handler::version::*;
use crate::invitation::ValidationError;
use crate::repository::RepositoryError;
use crate::store::StoreError;

pub mod health;
pub mod invitations;
pub mod version;

/// The result that is used throughout the complete api.
pub type ApiResult<T> = Result<T, ApiError>;

/// A uuid taken from the request path
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct PathUuid {
    pub(crate) uuid: Uuid,
}

#[derive(Serialize_repr, ToSchema)]
#[repr(u16)]
pub(crate) enum ApiStatusCode {
    InvalidJson = 1000,
    ValidationFailed = 1001,
    InvalidImage = 1002,
    InvitationNotFound = 1003,
    RouteNotFound = 1004,

    InternalServerError = 2000,
    DatabaseError = 2001,
    ViewCountContention = 2002,
}

#[derive(Serialize, ToSchema)]
pub(crate) struct ApiErrorResponse {
    #[schema(example = "Error message is here")]
    message: String,
    #[schema(example = 1000)]
    status_code: ApiStatusCode,
}

impl ApiErrorResponse {
    fn new(status_code: ApiStatusCode, message: String) -> Self {
        Self {
            message,
            status_code,
        }
    }
}

/// This enum holds all possible error types that can occur in the API
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be parsed
    InvalidJson(JsonPayloadError),
    /// The submitted draft is not a valid invitation
    Validation(ValidationError),
    /// An uploaded image is not valid base64
    InvalidImage(String),
    /// The requested invitation does not exist
    InvitationNotFound(Uuid),
    /// No route matched the request
    RouteNotFound,
    /// All errors that are thrown by the store
    StoreError(StoreError),
    /// The view count could not be updated because of concurrent viewers
    ViewCountContention(Uuid),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidJson(err) => write!(f, "Invalid json: {err}"),
            ApiError::Validation(err) => write!(f, "{err}"),
            ApiError::InvalidImage(name) => write!(f, "Image {name} is not valid base64"),
            ApiError::InvitationNotFound(uuid) => write!(f, "Invitation {uuid} not found"),
            ApiError::RouteNotFound => write!(f, "Not found"),
            ApiError::StoreError(_) => write!(f, "Database error occurred"),
            ApiError::ViewCountContention(_) => {
                write!(f, "Too many concurrent viewers, try again")
            }
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            ApiError::InvalidJson(err) => {
                debug!("Received invalid json: {err}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(
                    ApiStatusCode::InvalidJson,
                    self.to_string(),
                ))
            }
            ApiError::Validation(err) => {
                debug!("Rejected invitation draft: {err}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(
                    ApiStatusCode::ValidationFailed,
                    self.to_string(),
                ))
            }
            ApiError::InvalidImage(name) => {
                debug!("Invalid image encoding in {name}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(
                    ApiStatusCode::InvalidImage,
                    self.to_string(),
                ))
            }
            ApiError::InvitationNotFound(_) => HttpResponse::NotFound().json(
                ApiErrorResponse::new(ApiStatusCode::InvitationNotFound, self.to_string()),
            ),
            ApiError::RouteNotFound => HttpResponse::NotFound().json(ApiErrorResponse::new(
                ApiStatusCode::RouteNotFound,
                self.to_string(),
            )),
            ApiError::StoreError(err) => {
                error!("Store error: {err}");

                HttpResponse::InternalServerError().json(ApiErrorResponse::new(
                    ApiStatusCode::DatabaseError,
                    self.to_string(),
                ))
            }
            ApiError::ViewCountContention(uuid) => {
                warn!("Gave up counting view of {uuid}");

                HttpResponse::ServiceUnavailable().json(ApiErrorResponse::new(
                    ApiStatusCode::ViewCountContention,
                    self.to_string(),
                ))
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Validation(err) => Self::Validation(err),
            RepositoryError::NotFound(uuid) => Self::InvitationNotFound(uuid),
            RepositoryError::Store(err) => Self::StoreError(err),
            RepositoryError::Contention(uuid) => Self::ViewCountContention(uuid),
        }
    }
}

impl From<JsonPayloadError> for ApiError {
    fn from(value: JsonPayloadError) -> Self {
        Self::InvalidJson(value)
    }
}
