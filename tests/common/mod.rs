#![allow(dead_code)]

use adoption_portal::{
    AppConfig, AppState,
    auth::{AuthUser, Claims, Role},
    error::ApiError,
    models::{
        AdoptionRequest, CreatePetRequest, Pet, RegisterShelterUserRequest, RegisterUserRequest,
        ShelterUser, UpdatePetRequest, UpdateShelterUserRequest, UpdateUserRequest, UsState, User,
    },
    repository::Repository,
};
use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// --- Mock Repository ---

/// MockRepoControl
///
/// The central control point for testing handler and extractor logic without a
/// database. Fields are pre-canned rows and switches; the trait implementation
/// below derives its answers purely from them.
pub struct MockRepoControl {
    pub user: Option<User>,
    pub shelter_user: Option<ShelterUser>,
    pub pet: Option<Pet>,
    pub pets: Vec<Pet>,
    pub states: Vec<UsState>,
    pub adoption_request: Option<AdoptionRequest>,
    pub adoption_requests: Vec<AdoptionRequest>,
    // When set, create/update calls fail with this error (e.g. a simulated
    // unique violation).
    pub write_failure: Option<ApiError>,
    pub delete_result: bool,
    // Records the (pet_id, is_adopted) writes resolve_adoption_request makes
    // on the pet row, so tests can check the flag mirrors the verdict.
    pub pet_flag_writes: std::sync::Mutex<Vec<(i64, bool)>>,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            user: None,
            shelter_user: None,
            pet: None,
            pets: vec![],
            states: vec![],
            adoption_request: None,
            adoption_requests: vec![],
            write_failure: None,
            delete_result: false,
            pet_flag_writes: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn create_user(
        &self,
        req: RegisterUserRequest,
        hashed_password: String,
    ) -> Result<User, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(User {
            id: 1,
            email: req.email,
            username: req.username,
            hashed_password,
            ..User::default()
        })
    }

    async fn get_user(&self, _id: i64) -> Option<User> {
        self.user.clone()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.user.clone().filter(|u| u.email == email)
    }

    async fn update_user(
        &self,
        _id: i64,
        req: UpdateUserRequest,
        hashed_password: String,
    ) -> Result<Option<User>, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(self.user.clone().map(|mut u| {
            u.email = req.email;
            u.hashed_password = hashed_password;
            if let Some(username) = req.username {
                u.username = username;
            }
            u
        }))
    }

    async fn delete_user(&self, _id: i64) -> bool {
        self.delete_result
    }

    async fn create_shelter_user(
        &self,
        req: RegisterShelterUserRequest,
        hashed_password: String,
    ) -> Result<ShelterUser, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(ShelterUser {
            id: 2,
            email: req.email,
            username: req.username,
            hashed_password,
            shelter_name: req.shelter_name,
            phone_num: req.phone_num,
            address: req.address,
            city: req.city,
            state_id: req.state_id,
            zip_code: req.zip_code,
            ..ShelterUser::default()
        })
    }

    async fn get_shelter_user(&self, _id: i64) -> Option<ShelterUser> {
        self.shelter_user.clone()
    }

    async fn find_shelter_user_by_email(&self, email: &str) -> Option<ShelterUser> {
        self.shelter_user.clone().filter(|s| s.email == email)
    }

    async fn update_shelter_user(
        &self,
        _id: i64,
        req: UpdateShelterUserRequest,
        hashed_password: String,
    ) -> Result<Option<ShelterUser>, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(self.shelter_user.clone().map(|mut s| {
            s.email = req.email;
            s.hashed_password = hashed_password;
            s
        }))
    }

    async fn delete_shelter_user(&self, _id: i64) -> bool {
        self.delete_result
    }

    async fn list_pets(&self, _species: Option<String>, _shelter_id: Option<i64>) -> Vec<Pet> {
        self.pets.clone()
    }

    async fn get_pet(&self, _id: i64) -> Option<Pet> {
        self.pet.clone()
    }

    async fn create_pet(&self, req: CreatePetRequest, shelter_id: i64) -> Result<Pet, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(Pet {
            id: 7,
            shelter_id,
            name: req.name,
            species: req.species,
            breed: req.breed,
            age: req.age,
            description: req.description,
            ..Pet::default()
        })
    }

    async fn update_pet(&self, _id: i64, shelter_id: i64, _req: UpdatePetRequest) -> Option<Pet> {
        self.pet.clone().filter(|p| p.shelter_id == shelter_id)
    }

    async fn delete_pet(&self, _id: i64, _shelter_id: i64) -> bool {
        self.delete_result
    }

    async fn create_adoption_request(
        &self,
        user_id: i64,
        pet_id: i64,
        shelter_id: i64,
        message: String,
    ) -> Result<AdoptionRequest, ApiError> {
        if let Some(err) = &self.write_failure {
            return Err(err.clone());
        }
        Ok(AdoptionRequest {
            id: 11,
            user_id,
            pet_id,
            shelter_id,
            message,
            ..AdoptionRequest::default()
        })
    }

    async fn list_user_adoption_requests(&self, _user_id: i64) -> Vec<AdoptionRequest> {
        self.adoption_requests.clone()
    }

    async fn list_shelter_adoption_requests(&self, _shelter_id: i64) -> Vec<AdoptionRequest> {
        self.adoption_requests.clone()
    }

    async fn resolve_adoption_request(
        &self,
        _id: i64,
        shelter_id: i64,
        is_accepted: bool,
    ) -> Option<AdoptionRequest> {
        let resolved = self
            .adoption_request
            .clone()
            .filter(|r| r.shelter_id == shelter_id)
            .map(|mut r| {
                r.is_accepted = is_accepted;
                r
            });
        if let Some(r) = &resolved {
            self.pet_flag_writes
                .lock()
                .unwrap()
                .push((r.pet_id, is_accepted));
        }
        resolved
    }

    async fn delete_adoption_request(&self, _id: i64, _user_id: i64) -> bool {
        self.delete_result
    }

    async fn list_states(&self) -> Vec<UsState> {
        self.states.clone()
    }
}

// --- Test Utilities ---

pub fn test_state(repo: MockRepoControl) -> AppState {
    AppState {
        repo: Arc::new(repo),
        config: AppConfig::default(),
    }
}

pub fn test_state_with_config(repo: MockRepoControl, config: AppConfig) -> AppState {
    AppState {
        repo: Arc::new(repo),
        config,
    }
}

// Variant keeping a handle on the mock so a test can inspect it after the
// handler ran.
pub fn test_state_shared(repo: Arc<MockRepoControl>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn user_principal(id: i64) -> AuthUser {
    AuthUser {
        id,
        role: Role::User,
    }
}

pub fn shelter_principal(id: i64) -> AuthUser {
    AuthUser {
        id,
        role: Role::Shelter,
    }
}

pub fn sample_user(id: i64) -> User {
    User {
        id,
        email: "sam@example.com".to_string(),
        username: "sam".to_string(),
        hashed_password: "$argon2id$stub".to_string(),
        ..User::default()
    }
}

pub fn sample_shelter_user(id: i64) -> ShelterUser {
    ShelterUser {
        id,
        email: "paws@example.com".to_string(),
        username: "paws".to_string(),
        hashed_password: "$argon2id$stub".to_string(),
        shelter_name: "Paws for a Cause".to_string(),
        phone_num: "5551234567".to_string(),
        address: "1 Shelter Way".to_string(),
        city: "Austin".to_string(),
        state_id: 43,
        zip_code: "78701".to_string(),
        ..ShelterUser::default()
    }
}

pub fn sample_pet(id: i64, shelter_id: i64) -> Pet {
    Pet {
        id,
        shelter_id,
        name: "Shana".to_string(),
        species: "dog".to_string(),
        breed: Some("collie".to_string()),
        age: 3,
        description: Some("Very good dog.".to_string()),
        is_adopted: false,
        ..Pet::default()
    }
}

/// Signs a token directly (bypassing issue_token) so tests can control the
/// expiry offset, including already-expired tokens.
pub fn make_token(secret: &str, id: i64, role: Role, exp_offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: id,
        role,
        iat: now as usize,
        exp: (now + exp_offset_secs).max(0) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}
