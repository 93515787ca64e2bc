use actix_web::get;
use actix_web::web::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::server::handler::{ApiErrorResponse, ApiResult, Repository};

/// The health data of this server
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = 1337)]
    stored_invitations: u64,
}

/// Request health data from this server.
///
/// `stored_invitations` is the number of invitations in the store.
/// A failing store results in a server error.
#[utoipa::path(
    tag = "Server status",
    context_path = "/api/v1",
    responses(
        (status = 200, description = "Health data of this server", body = HealthResponse),
        (status = 500, description = "Server error", body = ApiErrorResponse),
    ),
)]
#[get("/health")]
pub async fn health(repository: Repository) -> ApiResult<Json<HealthResponse>> {
    let stored_invitations = repository.count().await?;

    Ok(Json(HealthResponse { stored_invitations }))
}

#[cfg(test)]
mod tests {
    use actix_web::web::{scope, Data};
    use actix_web::{test, App};
    use serde_json::Value;

    use super::*;
    use crate::invitation::tests::draft;
    use crate::repository::InvitationRepository;
    use crate::store::{MemoryStore, Store};

    #[actix_web::test]
    async fn counts_stored_invitations() {
        let repository = InvitationRepository::new(Store::Memory(MemoryStore::default()));
        repository.create(&draft()).await.unwrap();
        repository.create(&draft()).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(repository))
                .service(scope("/api/v1").service(health)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stored_invitations"], 2);
    }
}
