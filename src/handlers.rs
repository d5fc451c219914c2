use crate::{
    AppState,
    auth::{self, AuthUser, Role},
    error::ApiError,
    models::{
        AdoptionRequestResponse, AdoptionRequestsResponse, AuthResponse, CreatePetRequest,
        LoginRequest, PetResponse, PetsResponse, RegisterShelterUserRequest, RegisterUserRequest,
        ResolveAdoptionRequest, ShelterUserResponse, StatesResponse, SubmitAdoptionRequest,
        UpdatePetRequest, UpdateShelterUserRequest, UpdateUserRequest, UserRef, UserResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Filter Structs ---

/// PetFilter
///
/// Accepted query parameters for the public pet listing endpoint (GET /pets).
/// Bound safely by Axum's Query extractor.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PetFilter {
    /// Optional case-insensitive species filter (e.g. "dog").
    pub species: Option<String>,
    /// Optional filter restricting results to a single shelter.
    pub shelter_id: Option<i64>,
}

// --- Guards ---

// Role guards, applied inside handlers after the auth layer has resolved the
// principal.

fn require_user_role(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.role != Role::User {
        return Err(ApiError::auth(
            "Unauthorized.",
            "This endpoint requires an ordinary user account.",
        ));
    }
    Ok(())
}

fn require_shelter_role(auth: &AuthUser) -> Result<(), ApiError> {
    if auth.role != Role::Shelter {
        return Err(ApiError::auth(
            "Unauthorized.",
            "This endpoint requires a shelter account.",
        ));
    }
    Ok(())
}

// A principal may only read or mutate its own account row.
fn require_self(auth: &AuthUser, id: i64) -> Result<(), ApiError> {
    if auth.id != id {
        return Err(ApiError::auth(
            "Unauthorized.",
            "You may only act on your own account.",
        ));
    }
    Ok(())
}

fn user_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "User not found.",
        format!("User with id of {} could not be found.", id),
    )
}

fn shelter_user_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "Shelter user not found.",
        format!("Shelter user with id of {} could not be found.", id),
    )
}

fn pet_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "Pet not found.",
        format!("Pet with id of {} could not be found.", id),
    )
}

fn adoption_request_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "Adoption request not found.",
        format!("Adoption request with id of {} could not be found.", id),
    )
}

fn login_failed() -> ApiError {
    ApiError::auth("Login failed", "The provided credentials were invalid.")
}

// --- Account Handlers (End Users) ---

/// register_user
///
/// [Public Route] Creates an ordinary user account. The password is hashed
/// here, before the repository is involved, and a token is issued immediately
/// so the client is logged in after registration.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    let hashed = auth::hash_password(&payload.password)?;
    let user = state.repo.create_user(payload, hashed).await?;
    let token = auth::issue_token(&state.config, user.id, Role::User)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserRef { id: user.id },
            token,
        }),
    ))
}

/// login_user
///
/// [Public Route] Verifies credentials and issues a fresh token. A missing
/// account and a wrong password produce the identical 401 body.
#[utoipa::path(
    post,
    path = "/users/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Login failed", body = crate::error::ErrorBody)
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .ok_or_else(login_failed)?;

    if !auth::verify_password(&payload.password, &user.hashed_password) {
        return Err(login_failed());
    }

    let token = auth::issue_token(&state.config, user.id, Role::User)?;
    Ok(Json(AuthResponse {
        user: UserRef { id: user.id },
        token,
    }))
}

/// get_user
///
/// [User Route] Retrieves the authenticated user's own record. The hashed
/// password field is excluded from serialization at the model level.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Found", body = UserResponse))
)]
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    require_user_role(&auth)?;
    require_self(&auth, id)?;

    match state.repo.get_user(id).await {
        Some(user) => Ok(Json(UserResponse { user })),
        None => Err(user_not_found(id)),
    }
}

/// update_user
///
/// [User Route] Updates the user's own record. Email and password are
/// mandatory; the new password is re-hashed before storage.
#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Updated", body = UserResponse))
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_user_role(&auth)?;
    require_self(&auth, id)?;
    payload.validate()?;

    let hashed = auth::hash_password(&payload.password)?;
    match state.repo.update_user(id, payload, hashed).await? {
        Some(user) => Ok(Json(UserResponse { user })),
        None => Err(user_not_found(id)),
    }
}

/// delete_user
///
/// [User Route] Deletes the user's own account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_user_role(&auth)?;
    require_self(&auth, id)?;

    if state.repo.delete_user(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(user_not_found(id))
    }
}

// --- Account Handlers (Shelters) ---

/// register_shelter_user
///
/// [Public Route] Creates a shelter account with its full profile and issues
/// a shelter-role token.
#[utoipa::path(
    post,
    path = "/shelter-users",
    request_body = RegisterShelterUserRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody)
    )
)]
pub async fn register_shelter_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterShelterUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    let hashed = auth::hash_password(&payload.password)?;
    let shelter = state.repo.create_shelter_user(payload, hashed).await?;
    let token = auth::issue_token(&state.config, shelter.id, Role::Shelter)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserRef { id: shelter.id },
            token,
        }),
    ))
}

/// login_shelter_user
///
/// [Public Route] Credential check + token issuance for shelter accounts.
#[utoipa::path(
    post,
    path = "/shelter-users/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Login failed", body = crate::error::ErrorBody)
    )
)]
pub async fn login_shelter_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;

    let shelter = state
        .repo
        .find_shelter_user_by_email(&payload.email)
        .await
        .ok_or_else(login_failed)?;

    if !auth::verify_password(&payload.password, &shelter.hashed_password) {
        return Err(login_failed());
    }

    let token = auth::issue_token(&state.config, shelter.id, Role::Shelter)?;
    Ok(Json(AuthResponse {
        user: UserRef { id: shelter.id },
        token,
    }))
}

/// get_shelter_user
///
/// [Shelter Route] Retrieves the authenticated shelter's own record, without
/// the hashed password field.
#[utoipa::path(
    get,
    path = "/shelter-users/{id}",
    params(("id" = i64, Path, description = "Shelter user ID")),
    responses(
        (status = 200, description = "Found", body = ShelterUserResponse),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_shelter_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShelterUserResponse>, ApiError> {
    require_shelter_role(&auth)?;
    require_self(&auth, id)?;

    match state.repo.get_shelter_user(id).await {
        Some(shelter_user) => Ok(Json(ShelterUserResponse { shelter_user })),
        None => Err(shelter_user_not_found(id)),
    }
}

/// update_shelter_user
///
/// [Shelter Route] Partial profile update plus mandatory credential
/// replacement, scoped to the shelter's own row.
#[utoipa::path(
    put,
    path = "/shelter-users/{id}",
    request_body = UpdateShelterUserRequest,
    responses((status = 200, description = "Updated", body = ShelterUserResponse))
)]
pub async fn update_shelter_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateShelterUserRequest>,
) -> Result<Json<ShelterUserResponse>, ApiError> {
    require_shelter_role(&auth)?;
    require_self(&auth, id)?;
    payload.validate()?;

    let hashed = auth::hash_password(&payload.password)?;
    match state.repo.update_shelter_user(id, payload, hashed).await? {
        Some(shelter_user) => Ok(Json(ShelterUserResponse { shelter_user })),
        None => Err(shelter_user_not_found(id)),
    }
}

/// delete_shelter_user
///
/// [Shelter Route] Deletes the shelter's own account.
#[utoipa::path(
    delete,
    path = "/shelter-users/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_shelter_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_shelter_role(&auth)?;
    require_self(&auth, id)?;

    if state.repo.delete_shelter_user(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(shelter_user_not_found(id))
    }
}

// --- Pet Handlers ---

/// list_pets
///
/// [Public Route] Lists pets available for adoption, with optional species and
/// shelter filters. Adopted pets are excluded at the repository level.
#[utoipa::path(
    get,
    path = "/pets",
    params(PetFilter),
    responses((status = 200, description = "Available pets", body = PetsResponse))
)]
pub async fn list_pets(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> Json<PetsResponse> {
    let pets = state.repo.list_pets(filter.species, filter.shelter_id).await;
    Json(PetsResponse { pets })
}

/// get_pet_details
///
/// [Public Route] Retrieves a single pet by ID, adopted or not.
#[utoipa::path(
    get,
    path = "/pets/{id}",
    params(("id" = i64, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Found", body = PetResponse),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn get_pet_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PetResponse>, ApiError> {
    match state.repo.get_pet(id).await {
        Some(pet) => Ok(Json(PetResponse { pet })),
        None => Err(pet_not_found(id)),
    }
}

/// create_pet
///
/// [Shelter Route] Lists a new pet for adoption. The owning shelter id is the
/// authenticated principal, never a body field.
#[utoipa::path(
    post,
    path = "/pets",
    request_body = CreatePetRequest,
    responses((status = 201, description = "Created", body = PetResponse))
)]
pub async fn create_pet(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePetRequest>,
) -> Result<(StatusCode, Json<PetResponse>), ApiError> {
    require_shelter_role(&auth)?;
    payload.validate()?;

    let pet = state.repo.create_pet(payload, auth.id).await?;
    Ok((StatusCode::CREATED, Json(PetResponse { pet })))
}

/// update_pet
///
/// [Shelter Route] Partial update of a pet the shelter owns. A pet owned by
/// another shelter yields the same 404 as a missing one.
#[utoipa::path(
    put,
    path = "/pets/{id}",
    request_body = UpdatePetRequest,
    responses((status = 200, description = "Updated", body = PetResponse))
)]
pub async fn update_pet(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePetRequest>,
) -> Result<Json<PetResponse>, ApiError> {
    require_shelter_role(&auth)?;
    payload.validate()?;

    match state.repo.update_pet(id, auth.id, payload).await {
        Some(pet) => Ok(Json(PetResponse { pet })),
        None => Err(pet_not_found(id)),
    }
}

/// delete_pet
///
/// [Shelter Route] Removes a pet listing, owner-scoped.
#[utoipa::path(
    delete,
    path = "/pets/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_pet(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_shelter_role(&auth)?;

    if state.repo.delete_pet(id, auth.id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(pet_not_found(id))
    }
}

// --- State Lookup ---

/// list_states
///
/// [Public Route] Returns the US state lookup table used by the shelter
/// registration form.
#[utoipa::path(
    get,
    path = "/states",
    responses((status = 200, description = "States", body = StatesResponse))
)]
pub async fn list_states(State(state): State<AppState>) -> Json<StatesResponse> {
    let states = state.repo.list_states().await;
    Json(StatesResponse { states })
}

// --- Adoption Request Handlers ---

/// submit_adoption_request
///
/// [User Route] Submits a request to adopt a pet. The target shelter is
/// derived from the pet record server-side so a client cannot route a request
/// to an unrelated shelter.
#[utoipa::path(
    post,
    path = "/adoption-requests",
    request_body = SubmitAdoptionRequest,
    responses(
        (status = 201, description = "Submitted", body = AdoptionRequestResponse),
        (status = 400, description = "Pet already adopted", body = crate::error::ErrorBody),
        (status = 404, description = "Pet not found", body = crate::error::ErrorBody)
    )
)]
pub async fn submit_adoption_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAdoptionRequest>,
) -> Result<(StatusCode, Json<AdoptionRequestResponse>), ApiError> {
    require_user_role(&auth)?;
    payload.validate()?;

    let pet = state
        .repo
        .get_pet(payload.pet_id)
        .await
        .ok_or_else(|| pet_not_found(payload.pet_id))?;

    // get_pet also serves the public detail page, so adopted pets are still
    // reachable by id; they just cannot be requested anymore.
    if pet.is_adopted {
        return Err(ApiError::validation(vec![
            "This pet has already been adopted.".to_string(),
        ]));
    }

    let adoption_request = state
        .repo
        .create_adoption_request(auth.id, pet.id, pet.shelter_id, payload.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdoptionRequestResponse { adoption_request }),
    ))
}

/// list_user_adoption_requests
///
/// [User Route] Lists the authenticated user's own adoption requests.
#[utoipa::path(
    get,
    path = "/users/{id}/adoption-requests",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "My requests", body = AdoptionRequestsResponse))
)]
pub async fn list_user_adoption_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdoptionRequestsResponse>, ApiError> {
    require_user_role(&auth)?;
    require_self(&auth, id)?;

    let adoption_requests = state.repo.list_user_adoption_requests(id).await;
    Ok(Json(AdoptionRequestsResponse { adoption_requests }))
}

/// list_shelter_adoption_requests
///
/// [Shelter Route] Lists the requests targeting the authenticated shelter.
#[utoipa::path(
    get,
    path = "/shelter-users/{id}/adoption-requests",
    params(("id" = i64, Path, description = "Shelter user ID")),
    responses((status = 200, description = "Incoming requests", body = AdoptionRequestsResponse))
)]
pub async fn list_shelter_adoption_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdoptionRequestsResponse>, ApiError> {
    require_shelter_role(&auth)?;
    require_self(&auth, id)?;

    let adoption_requests = state.repo.list_shelter_adoption_requests(id).await;
    Ok(Json(AdoptionRequestsResponse { adoption_requests }))
}

/// resolve_adoption_request
///
/// [Shelter Route] Records the shelter's verdict on a request it received.
/// Accepting also marks the pet as adopted (one transaction in the repository).
#[utoipa::path(
    put,
    path = "/adoption-requests/{id}/status",
    params(("id" = i64, Path, description = "Adoption request ID")),
    request_body = ResolveAdoptionRequest,
    responses(
        (status = 200, description = "Resolved", body = AdoptionRequestResponse),
        (status = 404, description = "Not Found or Not Yours", body = crate::error::ErrorBody)
    )
)]
pub async fn resolve_adoption_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ResolveAdoptionRequest>,
) -> Result<Json<AdoptionRequestResponse>, ApiError> {
    require_shelter_role(&auth)?;

    match state
        .repo
        .resolve_adoption_request(id, auth.id, payload.is_accepted)
        .await
    {
        Some(adoption_request) => Ok(Json(AdoptionRequestResponse { adoption_request })),
        // Covers both a missing request and one addressed to another shelter.
        None => Err(adoption_request_not_found(id)),
    }
}

/// withdraw_adoption_request
///
/// [User Route] Withdraws (deletes) the user's own pending request.
#[utoipa::path(
    delete,
    path = "/adoption-requests/{id}",
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn withdraw_adoption_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_user_role(&auth)?;

    if state.repo.delete_adoption_request(id, auth.id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(adoption_request_not_found(id))
    }
}
