pub mod auth;
pub mod clients;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, auth, client API and OpenAPI docs
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    // Static segments win over `:id` when both match
    let api = Router::new()
        .route("/api/clients", get(clients::list).post(clients::create))
        .route("/api/clients/search", get(clients::search))
        .route("/api/clients/all", get(clients::all))
        .route("/api/clients/by-name", get(clients::by_name))
        .route("/api/clients/by-last-name", get(clients::by_last_name))
        .route("/api/clients/uuid/:uuid", get(clients::get_by_uuid))
        .route("/api/clients/username/:username", get(clients::get_by_username))
        .route(
            "/api/clients/:id",
            get(clients::get_by_id).put(clients::update).delete(clients::delete),
        );

    let docs = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    public
        .merge(api)
        .with_state(state)
        .merge(docs)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
