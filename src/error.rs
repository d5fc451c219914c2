use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// ApiError
///
/// The single error currency of the application. Every failure a handler can
/// produce (validation, authentication, missing rows, database trouble) is
/// expressed as one of these and rendered by the centralized responder below.
///
/// The wire shape is `{ "title": ..., "errors": [...] }`, matching what the
/// frontend already consumes: a short human-readable title plus a list of
/// individual messages (one per failed validation rule, usually one otherwise).
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub title: String,
    pub errors: Vec<String>,
}

/// ErrorBody
///
/// Serialized form of an ApiError. Kept separate so the status code never leaks
/// into the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub title: String,
    pub errors: Vec<String>,
}

impl ApiError {
    /// 400: one or more request fields failed validation. `errors` carries every
    /// failed rule's message so the client can render them all at once.
    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            title: "Bad request.".to_string(),
            errors,
        }
    }

    /// 401: missing/invalid credentials or a token presented to an endpoint
    /// reserved for the other role.
    pub fn auth(title: &str, message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            title: title.to_string(),
            errors: vec![message.to_string()],
        }
    }

    /// 404 with an entity-specific title (e.g. "Shelter user not found.").
    pub fn not_found(title: &str, message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: title.to_string(),
            errors: vec![message],
        }
    }

    /// 500: anything unexpected. The detail stays in the logs, never in the body.
    pub fn server() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: "Internal server error.".to_string(),
            errors: vec!["Something went wrong on our end.".to_string()],
        }
    }

    /// from_sqlx
    ///
    /// Central mapping from database failures to API responses. A unique-key
    /// violation (duplicate email/username) is a client problem and surfaces as
    /// a validation error; everything else is logged and collapsed to a 500.
    pub fn from_sqlx(context: &str, e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return Self::validation(vec![
                    "Email or username is already in use.".to_string(),
                ]);
            }
            if db_err.is_foreign_key_violation() {
                return Self::validation(vec![
                    "A referenced record does not exist.".to_string(),
                ]);
            }
        }
        tracing::error!("{} error: {:?}", context, e);
        Self::server()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            title: self.title,
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}
