use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Shelter Router Module
///
/// Routes reserved for shelter accounts: account self-service, pet listing
/// management, and resolving incoming adoption requests. Authentication is
/// enforced by the auth layer wrapping this router; the shelter-role guard
/// runs inside each handler.
pub fn shelter_routes() -> Router<AppState> {
    Router::new()
        // GET/PUT/DELETE /shelter-users/{id}
        // Shelter account self-service. GET never exposes the hashed password
        // (excluded at the model level); PUT re-hashes the credential.
        .route(
            "/shelter-users/{id}",
            get(handlers::get_shelter_user)
                .put(handlers::update_shelter_user)
                .delete(handlers::delete_shelter_user),
        )
        // GET /shelter-users/{id}/adoption-requests: requests addressed to
        // this shelter, newest first.
        .route(
            "/shelter-users/{id}/adoption-requests",
            get(handlers::list_shelter_adoption_requests),
        )
        // POST /pets: list a new pet; ownership comes from the principal.
        .route("/pets", post(handlers::create_pet))
        // PUT/DELETE /pets/{id}: owner-scoped in the repository query, so a
        // foreign pet 404s rather than leaking its existence.
        .route(
            "/pets/{id}",
            put(handlers::update_pet).delete(handlers::delete_pet),
        )
        // PUT /adoption-requests/{id}/status: accept or decline a request;
        // accepting flips the pet's is_adopted flag in the same transaction.
        .route(
            "/adoption-requests/{id}/status",
            put(handlers::resolve_adoption_request),
        )
}
