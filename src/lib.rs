use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Users, Shelters).
pub mod routes;
use auth::AuthUser;
use routes::{public, shelters, users};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates every handler decorated with `#[utoipa::path]` and every schema
/// used in request/response bodies. The resulting JSON is served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login_user, handlers::get_user,
        handlers::update_user, handlers::delete_user,
        handlers::register_shelter_user, handlers::login_shelter_user,
        handlers::get_shelter_user, handlers::update_shelter_user,
        handlers::delete_shelter_user,
        handlers::list_pets, handlers::get_pet_details, handlers::create_pet,
        handlers::update_pet, handlers::delete_pet,
        handlers::list_states,
        handlers::submit_adoption_request, handlers::list_user_adoption_requests,
        handlers::list_shelter_adoption_requests, handlers::resolve_adoption_request,
        handlers::withdraw_adoption_request
    ),
    components(
        schemas(
            models::User, models::ShelterUser, models::Pet, models::AdoptionRequest,
            models::UsState,
            models::RegisterUserRequest, models::LoginRequest, models::UpdateUserRequest,
            models::RegisterShelterUserRequest, models::UpdateShelterUserRequest,
            models::CreatePetRequest, models::UpdatePetRequest,
            models::SubmitAdoptionRequest, models::ResolveAdoptionRequest,
            models::AuthResponse, models::UserRef, models::UserResponse,
            models::ShelterUserResponse, models::PetResponse, models::PetsResponse,
            models::StatesResponse, models::AdoptionRequestResponse,
            models::AdoptionRequestsResponse,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "adoption-portal", description = "Pet Adoption API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow the AuthUser extractor (and handlers) to selectively pull
// components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected route groups. It attempts to
/// extract `AuthUser` from the request; if token validation or the DB lookup
/// fails, the extractor rejects the request with a 401 `{ title, errors }`
/// body before the handler runs. The role guards themselves live inside the
/// handlers, since users and shelters share the auth layer.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // User routes: protected by the auth layer; the user-role guard runs
        // inside the handlers.
        .merge(
            users::user_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Shelter routes: same auth layer, shelter-role guard in the handlers.
        .merge(
            shelters::shelter_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers (applied outermost/first).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a span
                // carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation: return the x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: extracts the `x-request-id`
/// header (if present) and includes it in the structured logging metadata
/// alongside the HTTP method and URI, so every log line for a single request
/// is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
