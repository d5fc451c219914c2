use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// User Router Module
///
/// Routes reserved for ordinary (adopting) user accounts. The router is
/// wrapped in the auth layer above this module, so every handler receives a
/// resolved `AuthUser`; the user-role and own-account guards run inside the
/// handlers, mirroring where the role checks live for shelters.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        // GET/PUT/DELETE /users/{id}
        // Account self-service. The path id must match the authenticated
        // principal; PUT replaces the stored credential with a fresh hash.
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // GET /users/{id}/adoption-requests: the user's own submissions,
        // pending and resolved.
        .route(
            "/users/{id}/adoption-requests",
            get(handlers::list_user_adoption_requests),
        )
        // POST /adoption-requests: ask to adopt a pet. The target shelter is
        // derived from the pet record, not the body.
        .route(
            "/adoption-requests",
            post(handlers::submit_adoption_request),
        )
        // DELETE /adoption-requests/{id}: withdraw an own request.
        .route(
            "/adoption-requests/{id}",
            delete(handlers::withdraw_adoption_request),
        )
}
