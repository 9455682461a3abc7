use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A row of the `"user"` table. Carries the bcrypt hash, so it is never serialized
/// into a response directly; handlers convert it into `UserResponse` first.
#[derive(Debug, Clone, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    // FK to role.id. Nullable in the schema.
    pub role_id: Option<i32>,
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Role
///
/// Seeded reference data (`teacher`, `student`). Authorization compares `description`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq, Eq)]
#[ts(export)]
pub struct Role {
    pub id: i32,
    pub description: String,
}

/// Post
///
/// A row of the `post` table joined twice against `"user"` for display names.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    #[ts(type = "string | null")]
    pub created_at: Option<NaiveDateTime>,
    #[ts(type = "string | null")]
    pub updated_at: Option<NaiveDateTime>,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    // Loaded via LEFT JOIN; absent on rows returned straight from INSERT/UPDATE.
    #[sqlx(default)]
    pub created_by_name: Option<String>,
    #[sqlx(default)]
    pub updated_by_name: Option<String>,
}

/// NewUser
///
/// Insert payload for the user repository. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: i32,
}

/// UserChanges
///
/// Profile fields rewritten by an update. The password has its own path.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: i32,
}

/// PostDraft
///
/// Title and content as written by a teacher; used for both create and update.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for registration (POST /user).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    #[schema(example = "professor@school.edu")]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub role_id: i32,
}

/// UpdateUserRequest
///
/// Input payload for PUT /user/{id}. An empty or absent password keeps the current one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[ts(optional)]
    pub password: Option<String>,
    pub role_id: i32,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// PostRequest
///
/// Body of POST /posts and PUT /posts/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 500))]
    #[schema(example = "My First Post")]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl From<PostRequest> for PostDraft {
    fn from(req: PostRequest) -> Self {
        PostDraft {
            title: req.title,
            content: req.content,
        }
    }
}

/// SearchQuery
///
/// Query string of GET /posts/search.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against title and content.
    #[validate(length(min = 1))]
    pub search: String,
}

// --- Response Payloads (Output Schemas) ---

/// UserResponse
///
/// The public view of a user. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: Option<i32>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role_id: user.role_id,
        }
    }
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// MessageResponse
///
/// The `{ "message": ... }` body used by every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
