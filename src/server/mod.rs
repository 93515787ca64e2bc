//! This module holds the server definition

use std::net::SocketAddr;

use actix_toolbox::tb_middleware::{setup_logging_mw, LoggingMiddlewareConfig};
use actix_web::http::StatusCode;
use actix_web::middleware::{Compress, ErrorHandlers};
use actix_web::web::{scope, Data, JsonConfig, PayloadConfig};
use actix_web::{App, HttpServer};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::ingest::ImageIngestor;
use crate::render::TemplateRenderer;
use crate::repository::InvitationRepository;
use crate::server::error::StartServerError;
use crate::server::handler::{
    create_invitation, get_invitation, get_invitations, health, version, view_invitation,
};
use crate::server::middleware::{handle_not_found, json_extractor_error};
use crate::server::swagger::ApiDoc;
use crate::store::Store;

pub mod error;
pub mod handler;
pub mod middleware;
pub mod swagger;

/// Start the invitare server
///
/// **Parameter**:
/// - `config`: Reference to a [Config] struct
/// - `repository`: [InvitationRepository] on top of the configured [Store]
/// - `renderer`: [TemplateRenderer] for the shareable pages
pub async fn start_server(
    config: &Config,
    repository: InvitationRepository<Store>,
    renderer: TemplateRenderer,
) -> Result<(), StartServerError> {
    let s_addr = SocketAddr::new(config.server.listen_address, config.server.listen_port);
    let max_request_size = config.server.max_request_size;

    let repository = Data::new(repository);
    let ingestor = Data::new(ImageIngestor::new(config.invitations.max_image_size));
    let renderer = Data::new(renderer);

    info!("Starting to listen on {}", s_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(PayloadConfig::default().limit(max_request_size))
            .app_data(
                JsonConfig::default()
                    .limit(max_request_size)
                    .error_handler(json_extractor_error),
            )
            .app_data(repository.clone())
            .app_data(ingestor.clone())
            .app_data(renderer.clone())
            .wrap(setup_logging_mw(LoggingMiddlewareConfig::default()))
            .wrap(Compress::default())
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, handle_not_found))
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()))
            .service(version)
            .service(view_invitation)
            .service(
                scope("/api/v1")
                    .service(create_invitation)
                    .service(get_invitations)
                    .service(get_invitation)
                    .service(health),
            )
    })
    .bind(s_addr)
    .map_err(|err| StartServerError::Bind(s_addr, err))?
    .run()
    .await?;

    Ok(())
}
