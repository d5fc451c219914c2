use crate::error::ApiError;
use crate::models::{
    AdoptionRequest, CreatePetRequest, Pet, RegisterShelterUserRequest, RegisterUserRequest,
    ShelterUser, UpdatePetRequest, UpdateShelterUserRequest, UpdateUserRequest, UsState, User,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers talk
/// to this trait object, never to the pool directly, so the data layer can be
/// swapped for a mock in tests (Repository Abstraction pattern).
///
/// Send + Sync + async_trait are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
///
/// Error discipline: reads return Option/Vec and log failures internally
/// (a missing row and a broken connection both render as "not here");
/// writes that can violate a uniqueness constraint return Result so the
/// duplicate surfaces to the client as a validation error instead of a crash.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(
        &self,
        req: RegisterUserRequest,
        hashed_password: String,
    ) -> Result<User, ApiError>;
    async fn get_user(&self, id: i64) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    // Replaces the stored credential; profile fields use COALESCE semantics.
    async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
        hashed_password: String,
    ) -> Result<Option<User>, ApiError>;
    async fn delete_user(&self, id: i64) -> bool;

    // --- Shelter Users ---
    async fn create_shelter_user(
        &self,
        req: RegisterShelterUserRequest,
        hashed_password: String,
    ) -> Result<ShelterUser, ApiError>;
    async fn get_shelter_user(&self, id: i64) -> Option<ShelterUser>;
    async fn find_shelter_user_by_email(&self, email: &str) -> Option<ShelterUser>;
    async fn update_shelter_user(
        &self,
        id: i64,
        req: UpdateShelterUserRequest,
        hashed_password: String,
    ) -> Result<Option<ShelterUser>, ApiError>;
    async fn delete_shelter_user(&self, id: i64) -> bool;

    // --- Pets ---
    // Public listing with filtering. Adopted pets are excluded here.
    async fn list_pets(&self, species: Option<String>, shelter_id: Option<i64>) -> Vec<Pet>;
    async fn get_pet(&self, id: i64) -> Option<Pet>;
    async fn create_pet(&self, req: CreatePetRequest, shelter_id: i64) -> Result<Pet, ApiError>;
    // Owner-only: updates only if shelter_id matches the pet's owning shelter.
    async fn update_pet(&self, id: i64, shelter_id: i64, req: UpdatePetRequest) -> Option<Pet>;
    // Owner-only: deletes only if shelter_id matches.
    async fn delete_pet(&self, id: i64, shelter_id: i64) -> bool;

    // --- Adoption Requests ---
    async fn create_adoption_request(
        &self,
        user_id: i64,
        pet_id: i64,
        shelter_id: i64,
        message: String,
    ) -> Result<AdoptionRequest, ApiError>;
    async fn list_user_adoption_requests(&self, user_id: i64) -> Vec<AdoptionRequest>;
    async fn list_shelter_adoption_requests(&self, shelter_id: i64) -> Vec<AdoptionRequest>;
    // Shelter verdict. Scoped to the shelter the request targets; accepting
    // also marks the pet adopted, atomically.
    async fn resolve_adoption_request(
        &self,
        id: i64,
        shelter_id: i64,
        is_accepted: bool,
    ) -> Option<AdoptionRequest>;
    // Owner-only withdrawal: deletes only if user_id matches the submitter.
    async fn delete_adoption_request(&self, id: i64, user_id: i64) -> bool;

    // --- Lookup Tables ---
    async fn list_states(&self) -> Vec<UsState>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLS: &str = "id, email, username, hashed_password, created_at, updated_at";
const SHELTER_COLS: &str = "id, email, username, hashed_password, shelter_name, phone_num, \
                            address, city, state_id, zip_code, created_at, updated_at";
const PET_COLS: &str =
    "id, shelter_id, name, species, breed, age, description, is_adopted, created_at, updated_at";
const REQUEST_COLS: &str =
    "id, user_id, pet_id, shelter_id, message, is_accepted, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    /// create_user
    ///
    /// Inserts a new end-user row. The caller has already hashed the password;
    /// plaintext never reaches this layer. Duplicate email/username surfaces
    /// through the ApiError mapping.
    async fn create_user(
        &self,
        req: RegisterUserRequest,
        hashed_password: String,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, hashed_password, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) RETURNING {USER_COLS}"
        ))
        .bind(req.email)
        .bind(req.username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("create_user", e))
    }

    async fn get_user(&self, id: i64) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_user_by_email error: {:?}", e);
                None
            })
    }

    /// update_user
    ///
    /// Replaces email and credential, COALESCEs the optional username.
    /// Returns Ok(None) when the row does not exist.
    async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
        hashed_password: String,
    ) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET email = $2, hashed_password = $3, username = COALESCE($4, username), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLS}"
        ))
        .bind(id)
        .bind(req.email)
        .bind(hashed_password)
        .bind(req.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("update_user", e))
    }

    async fn delete_user(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    // --- SHELTER USERS ---

    async fn create_shelter_user(
        &self,
        req: RegisterShelterUserRequest,
        hashed_password: String,
    ) -> Result<ShelterUser, ApiError> {
        sqlx::query_as::<_, ShelterUser>(&format!(
            "INSERT INTO shelter_users \
             (email, username, hashed_password, shelter_name, phone_num, address, city, \
              state_id, zip_code, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             RETURNING {SHELTER_COLS}"
        ))
        .bind(req.email)
        .bind(req.username)
        .bind(hashed_password)
        .bind(req.shelter_name)
        .bind(req.phone_num)
        .bind(req.address)
        .bind(req.city)
        .bind(req.state_id)
        .bind(req.zip_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("create_shelter_user", e))
    }

    async fn get_shelter_user(&self, id: i64) -> Option<ShelterUser> {
        sqlx::query_as::<_, ShelterUser>(&format!(
            "SELECT {SHELTER_COLS} FROM shelter_users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_shelter_user error: {:?}", e);
            None
        })
    }

    async fn find_shelter_user_by_email(&self, email: &str) -> Option<ShelterUser> {
        sqlx::query_as::<_, ShelterUser>(&format!(
            "SELECT {SHELTER_COLS} FROM shelter_users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_shelter_user_by_email error: {:?}", e);
            None
        })
    }

    /// update_shelter_user
    ///
    /// Email and credential are replaced; every profile field COALESCEs so only
    /// the fields the client sent actually change.
    async fn update_shelter_user(
        &self,
        id: i64,
        req: UpdateShelterUserRequest,
        hashed_password: String,
    ) -> Result<Option<ShelterUser>, ApiError> {
        sqlx::query_as::<_, ShelterUser>(&format!(
            "UPDATE shelter_users \
             SET email = $2, hashed_password = $3, \
                 username = COALESCE($4, username), \
                 shelter_name = COALESCE($5, shelter_name), \
                 phone_num = COALESCE($6, phone_num), \
                 address = COALESCE($7, address), \
                 city = COALESCE($8, city), \
                 state_id = COALESCE($9, state_id), \
                 zip_code = COALESCE($10, zip_code), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {SHELTER_COLS}"
        ))
        .bind(id)
        .bind(req.email)
        .bind(hashed_password)
        .bind(req.username)
        .bind(req.shelter_name)
        .bind(req.phone_num)
        .bind(req.address)
        .bind(req.city)
        .bind(req.state_id)
        .bind(req.zip_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("update_shelter_user", e))
    }

    async fn delete_shelter_user(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM shelter_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_shelter_user error: {:?}", e);
                false
            }
        }
    }

    // --- PETS ---

    /// list_pets
    ///
    /// Flexible filtering via QueryBuilder for safe parameterization. The base
    /// query excludes pets that have already been adopted.
    async fn list_pets(&self, species: Option<String>, shelter_id: Option<i64>) -> Vec<Pet> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {PET_COLS} FROM pets WHERE is_adopted = false"
        ));

        if let Some(s) = species {
            builder.push(" AND species ILIKE ");
            builder.push_bind(s);
        }
        if let Some(id) = shelter_id {
            builder.push(" AND shelter_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY created_at DESC");

        match builder.build_query_as::<Pet>().fetch_all(&self.pool).await {
            Ok(pets) => pets,
            Err(e) => {
                tracing::error!("list_pets error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_pet(&self, id: i64) -> Option<Pet> {
        sqlx::query_as::<_, Pet>(&format!("SELECT {PET_COLS} FROM pets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_pet error: {:?}", e);
                None
            })
    }

    async fn create_pet(&self, req: CreatePetRequest, shelter_id: i64) -> Result<Pet, ApiError> {
        sqlx::query_as::<_, Pet>(&format!(
            "INSERT INTO pets \
             (shelter_id, name, species, breed, age, description, is_adopted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, false, NOW(), NOW()) RETURNING {PET_COLS}"
        ))
        .bind(shelter_id)
        .bind(req.name)
        .bind(req.species)
        .bind(req.breed)
        .bind(req.age)
        .bind(req.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("create_pet", e))
    }

    /// update_pet
    ///
    /// COALESCE partial update, scoped to the owning shelter. A pet belonging
    /// to another shelter behaves as if it did not exist.
    async fn update_pet(&self, id: i64, shelter_id: i64, req: UpdatePetRequest) -> Option<Pet> {
        sqlx::query_as::<_, Pet>(&format!(
            "UPDATE pets \
             SET name = COALESCE($3, name), species = COALESCE($4, species), \
                 breed = COALESCE($5, breed), age = COALESCE($6, age), \
                 description = COALESCE($7, description), updated_at = NOW() \
             WHERE id = $1 AND shelter_id = $2 RETURNING {PET_COLS}"
        ))
        .bind(id)
        .bind(shelter_id)
        .bind(req.name)
        .bind(req.species)
        .bind(req.breed)
        .bind(req.age)
        .bind(req.description)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_pet error: {:?}", e);
            None
        })
    }

    async fn delete_pet(&self, id: i64, shelter_id: i64) -> bool {
        match sqlx::query("DELETE FROM pets WHERE id = $1 AND shelter_id = $2")
            .bind(id)
            .bind(shelter_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_pet error: {:?}", e);
                false
            }
        }
    }

    // --- ADOPTION REQUESTS ---

    async fn create_adoption_request(
        &self,
        user_id: i64,
        pet_id: i64,
        shelter_id: i64,
        message: String,
    ) -> Result<AdoptionRequest, ApiError> {
        sqlx::query_as::<_, AdoptionRequest>(&format!(
            "INSERT INTO adoption_requests \
             (user_id, pet_id, shelter_id, message, is_accepted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, false, NOW(), NOW()) RETURNING {REQUEST_COLS}"
        ))
        .bind(user_id)
        .bind(pet_id)
        .bind(shelter_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::from_sqlx("create_adoption_request", e))
    }

    async fn list_user_adoption_requests(&self, user_id: i64) -> Vec<AdoptionRequest> {
        sqlx::query_as::<_, AdoptionRequest>(&format!(
            "SELECT {REQUEST_COLS} FROM adoption_requests \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_user_adoption_requests error: {:?}", e);
            vec![]
        })
    }

    async fn list_shelter_adoption_requests(&self, shelter_id: i64) -> Vec<AdoptionRequest> {
        sqlx::query_as::<_, AdoptionRequest>(&format!(
            "SELECT {REQUEST_COLS} FROM adoption_requests \
             WHERE shelter_id = $1 ORDER BY created_at DESC"
        ))
        .bind(shelter_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_shelter_adoption_requests error: {:?}", e);
            vec![]
        })
    }

    /// resolve_adoption_request
    ///
    /// Records the shelter's verdict inside a transaction: the acceptance flag
    /// and the pet's is_adopted bit must never disagree, so the pet row is
    /// updated on accept and decline alike. The WHERE clause scopes the update
    /// to the shelter the request targets.
    async fn resolve_adoption_request(
        &self,
        id: i64,
        shelter_id: i64,
        is_accepted: bool,
    ) -> Option<AdoptionRequest> {
        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!("resolve_adoption_request begin error: {:?}", e);
                return None;
            }
        };

        let updated = sqlx::query_as::<_, AdoptionRequest>(&format!(
            "UPDATE adoption_requests SET is_accepted = $3, updated_at = NOW() \
             WHERE id = $1 AND shelter_id = $2 RETURNING {REQUEST_COLS}"
        ))
        .bind(id)
        .bind(shelter_id)
        .bind(is_accepted)
        .fetch_optional(&mut *tx)
        .await;

        let request = match updated {
            Ok(Some(request)) => request,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("resolve_adoption_request error: {:?}", e);
                return None;
            }
        };

        // Mirror the verdict in both directions: declining (or reversing an
        // earlier acceptance) puts the pet back on the public listing.
        if let Err(e) = sqlx::query(
            "UPDATE pets SET is_adopted = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(request.pet_id)
        .bind(is_accepted)
        .execute(&mut *tx)
        .await
        {
            tracing::error!("resolve_adoption_request pet flag error: {:?}", e);
            return None;
        }

        match tx.commit().await {
            Ok(()) => Some(request),
            Err(e) => {
                tracing::error!("resolve_adoption_request commit error: {:?}", e);
                None
            }
        }
    }

    async fn delete_adoption_request(&self, id: i64, user_id: i64) -> bool {
        match sqlx::query("DELETE FROM adoption_requests WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_adoption_request error: {:?}", e);
                false
            }
        }
    }

    // --- LOOKUP TABLES ---

    async fn list_states(&self) -> Vec<UsState> {
        sqlx::query_as::<_, UsState>("SELECT id, name FROM states ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_states error: {:?}", e);
                vec![]
            })
    }
}
