use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are unauthenticated and accessible to any client.
/// These routes handle the identity gateway (registration and token issuance
/// for both account kinds) and read-only browsing of adoptable pets.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /users: end-user registration. Responds 201 { user: { id }, token }.
        .route("/users", post(handlers::register_user))
        // POST /users/token: end-user login.
        .route("/users/token", post(handlers::login_user))
        // POST /shelter-users: shelter registration with the full profile.
        .route("/shelter-users", post(handlers::register_shelter_user))
        // POST /shelter-users/token: shelter login.
        .route("/shelter-users/token", post(handlers::login_shelter_user))
        // GET /pets?species=...&shelterId=...
        // Lists pets still available for adoption; adopted pets are filtered
        // out at the repository level.
        .route("/pets", get(handlers::list_pets))
        // GET /pets/{id}: detailed view of a single pet.
        .route("/pets/{id}", get(handlers::get_pet_details))
        // GET /states: the lookup table backing the shelter signup form.
        .route("/states", get(handlers::list_states))
}
