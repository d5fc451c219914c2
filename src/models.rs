use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::ApiError;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// An ordinary adopting end user, stored in the `users` table. Distinct from a
/// ShelterUser: this account can browse pets and submit adoption requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,

    /// The Argon2id PHC string. Never serialized: every response shape that
    /// embeds a User must omit the credential material.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(ignore)]
    pub hashed_password: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ShelterUser
///
/// An account representing an animal shelter, stored in the `shelter_users`
/// table. Owns pets and receives/accepts adoption requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShelterUser {
    pub id: i64,
    pub email: String,
    pub username: String,

    // Same rule as User: the stored hash never crosses the wire.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(ignore)]
    pub hashed_password: String,

    pub shelter_name: String,
    pub phone_num: String,
    pub address: String,
    pub city: String,
    // FK to the `states` lookup table.
    pub state_id: i64,
    pub zip_code: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Pet
///
/// A pet listed for adoption by a shelter, stored in the `pets` table.
/// `is_adopted` flips to true when the shelter accepts an adoption request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pet {
    pub id: i64,
    // FK to shelter_users.id (owning shelter).
    pub shelter_id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: i32,
    pub description: Option<String>,
    pub is_adopted: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// AdoptionRequest
///
/// A record linking a user, a pet, and the pet's shelter, with an acceptance
/// flag. Stored in the `adoption_requests` table. Created by users, resolved
/// (accepted) by the shelter that owns the pet.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdoptionRequest {
    pub id: i64,
    pub user_id: i64,
    pub pet_id: i64,
    pub shelter_id: i64,
    pub message: String,
    pub is_accepted: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// UsState
///
/// Row of the `states` lookup table referenced by ShelterUser.state_id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UsState {
    pub id: i64,
    pub name: String,
}

// --- Request Payloads (Input Schemas) ---

// Field length limits enforced by the column definitions in schema.sql.
const MAX_USERNAME_LEN: usize = 32;
const MAX_SHELTER_NAME_LEN: usize = 128;
const MAX_PHONE_LEN: usize = 10;
const MAX_ZIP_LEN: usize = 5;

/// Minimal structural email check: one '@', non-empty local part, and a dot
/// somewhere in the domain. Anything stricter belongs in a confirmation email.
fn is_valid_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn check(errors: &mut Vec<String>, ok: bool, message: &str) {
    if !ok {
        errors.push(message.to_string());
    }
}

fn finish(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}

/// RegisterUserRequest
///
/// Input payload for the public end-user registration endpoint (POST /users).
/// The password is hashed before it ever reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterUserRequest {
    /// Collects every failed rule into a single 400 so the client can render
    /// all messages at once.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            is_valid_email(&self.email),
            "Please provide a valid email.",
        );
        check(
            &mut errors,
            !self.username.is_empty(),
            "Please provide a username.",
        );
        check(
            &mut errors,
            self.username.len() <= MAX_USERNAME_LEN,
            "Username cannot be longer than 32 characters.",
        );
        check(
            &mut errors,
            !self.password.is_empty(),
            "Please provide a password.",
        );
        finish(errors)
    }
}

/// LoginRequest
///
/// Input payload for both token endpoints (POST /users/token and
/// POST /shelter-users/token).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            is_valid_email(&self.email),
            "Please provide a valid email.",
        );
        check(
            &mut errors,
            !self.password.is_empty(),
            "Please provide a password.",
        );
        finish(errors)
    }
}

/// UpdateUserRequest
///
/// Payload for PUT /users/{id}. Email and password are mandatory (the update
/// always re-hashes and replaces the stored credential); username is optional
/// and handled with COALESCE in the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            is_valid_email(&self.email),
            "Please provide a valid email.",
        );
        check(
            &mut errors,
            !self.password.is_empty(),
            "Please provide a password.",
        );
        if let Some(username) = &self.username {
            check(
                &mut errors,
                !username.is_empty(),
                "Please provide a username.",
            );
            check(
                &mut errors,
                username.len() <= MAX_USERNAME_LEN,
                "Username cannot be longer than 32 characters.",
            );
        }
        finish(errors)
    }
}

/// RegisterShelterUserRequest
///
/// Input payload for creating a shelter account (POST /shelter-users). Carries
/// the full shelter profile; every rule failure below surfaces in the 400 body
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterShelterUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub shelter_name: String,
    pub phone_num: String,
    pub address: String,
    pub city: String,
    pub state_id: i64,
    pub zip_code: String,
}

impl RegisterShelterUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            is_valid_email(&self.email),
            "Please provide a valid email.",
        );
        check(
            &mut errors,
            !self.username.is_empty(),
            "Please provide a username.",
        );
        check(
            &mut errors,
            self.username.len() <= MAX_USERNAME_LEN,
            "Username cannot be longer than 32 characters.",
        );
        check(
            &mut errors,
            !self.password.is_empty(),
            "Please provide a password.",
        );
        check(
            &mut errors,
            !self.shelter_name.is_empty(),
            "Please provide a shelter name.",
        );
        check(
            &mut errors,
            self.shelter_name.len() <= MAX_SHELTER_NAME_LEN,
            "Name cannot be longer than 128 characters.",
        );
        check(
            &mut errors,
            !self.phone_num.is_empty(),
            "Please provide a phone number.",
        );
        check(
            &mut errors,
            self.phone_num.len() <= MAX_PHONE_LEN,
            "Please provide a valid phone number.",
        );
        check(
            &mut errors,
            !self.address.is_empty(),
            "Please provide an address.",
        );
        check(
            &mut errors,
            !self.city.is_empty(),
            "Please provide a city name.",
        );
        check(&mut errors, self.state_id > 0, "Please select a state.");
        check(
            &mut errors,
            !self.zip_code.is_empty(),
            "Please provide a zip code.",
        );
        check(
            &mut errors,
            self.zip_code.len() <= MAX_ZIP_LEN,
            "Please provide a valid zip code.",
        );
        finish(errors)
    }
}

/// UpdateShelterUserRequest
///
/// Partial update payload for PUT /shelter-users/{id}. Email and password are
/// mandatory (credential replacement); the profile fields are Option<T> and
/// applied with COALESCE so only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateShelterUserRequest {
    pub email: String,
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_num: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl UpdateShelterUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            is_valid_email(&self.email),
            "Please provide a valid email.",
        );
        check(
            &mut errors,
            !self.password.is_empty(),
            "Please provide a password.",
        );
        // Optional fields skip the row's current value when absent, but a
        // provided value obeys the same rules as registration: COALESCE must
        // never smuggle an empty string into a required column.
        if let Some(username) = &self.username {
            check(
                &mut errors,
                !username.is_empty(),
                "Please provide a username.",
            );
            check(
                &mut errors,
                username.len() <= MAX_USERNAME_LEN,
                "Username cannot be longer than 32 characters.",
            );
        }
        if let Some(name) = &self.shelter_name {
            check(
                &mut errors,
                !name.is_empty(),
                "Please provide a shelter name.",
            );
            check(
                &mut errors,
                name.len() <= MAX_SHELTER_NAME_LEN,
                "Name cannot be longer than 128 characters.",
            );
        }
        if let Some(phone) = &self.phone_num {
            check(
                &mut errors,
                !phone.is_empty(),
                "Please provide a phone number.",
            );
            check(
                &mut errors,
                phone.len() <= MAX_PHONE_LEN,
                "Please provide a valid phone number.",
            );
        }
        if let Some(address) = &self.address {
            check(
                &mut errors,
                !address.is_empty(),
                "Please provide an address.",
            );
        }
        if let Some(city) = &self.city {
            check(&mut errors, !city.is_empty(), "Please provide a city name.");
        }
        if let Some(state_id) = self.state_id {
            check(&mut errors, state_id > 0, "Please select a state.");
        }
        if let Some(zip) = &self.zip_code {
            check(
                &mut errors,
                !zip.is_empty(),
                "Please provide a zip code.",
            );
            check(
                &mut errors,
                zip.len() <= MAX_ZIP_LEN,
                "Please provide a valid zip code.",
            );
        }
        finish(errors)
    }
}

/// CreatePetRequest
///
/// Input payload for a shelter listing a new pet (POST /pets). The owning
/// shelter id comes from the authenticated principal, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreatePetRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(&mut errors, !self.name.is_empty(), "Please provide a name.");
        check(
            &mut errors,
            !self.species.is_empty(),
            "Please provide a species.",
        );
        check(&mut errors, self.age >= 0, "Please provide a valid age.");
        finish(errors)
    }
}

/// UpdatePetRequest
///
/// Partial update for PUT /pets/{id}; all fields optional, COALESCE semantics.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdatePetRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check(&mut errors, !name.is_empty(), "Please provide a name.");
        }
        if let Some(species) = &self.species {
            check(
                &mut errors,
                !species.is_empty(),
                "Please provide a species.",
            );
        }
        if let Some(age) = self.age {
            check(&mut errors, age >= 0, "Please provide a valid age.");
        }
        finish(errors)
    }
}

/// SubmitAdoptionRequest
///
/// Input payload for a user asking to adopt a pet (POST /adoption-requests).
/// The shelter id is derived server-side from the pet record, and the user id
/// from the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmitAdoptionRequest {
    pub pet_id: i64,
    pub message: String,
}

impl SubmitAdoptionRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check(&mut errors, self.pet_id > 0, "Please select a pet.");
        check(
            &mut errors,
            !self.message.is_empty(),
            "Please provide a message.",
        );
        finish(errors)
    }
}

/// ResolveAdoptionRequest
///
/// Body of PUT /adoption-requests/{id}/status: the shelter's verdict.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolveAdoptionRequest {
    pub is_accepted: bool,
}

// --- Response Shapes (Output Schemas) ---

/// UserRef
///
/// The slim identity embedded in auth responses: `{ user: { id }, token }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserRef {
    pub id: i64,
}

/// AuthResponse
///
/// Returned by both registration and token endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserRef,
    pub token: String,
}

/// Entity envelope shapes. The API always wraps a single entity or a list in
/// an object keyed by the entity name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShelterUserResponse {
    pub shelter_user: ShelterUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PetResponse {
    pub pet: Pet,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PetsResponse {
    pub pets: Vec<Pet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatesResponse {
    pub states: Vec<UsState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdoptionRequestResponse {
    pub adoption_request: AdoptionRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdoptionRequestsResponse {
    pub adoption_requests: Vec<AdoptionRequest>,
}
