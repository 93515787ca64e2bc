use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::ResponseError;

use crate::server::handler::ApiError;

/// Replace the empty body of unmatched routes with an api error.
///
/// Responses that already carry a body, e.g. an unknown invitation, are kept.
pub(crate) fn handle_not_found<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if res.headers().contains_key(CONTENT_TYPE) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, ApiError::RouteNotFound.error_response());

    Ok(ErrorHandlerResponse::Response(res.map_into_right_body()))
}
