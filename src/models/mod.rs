/// Data models
///
/// Records carry their own lifecycle: constructors stamp creation timestamps
/// and the mutation helpers bump `updated_at` / set `deleted_at`, so the
/// persistence layer never relies on triggers or lifecycle hooks.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// User identity record. The password hash is never serialized outward.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub profile: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A user pending insertion; the database assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub profile: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        // Random placeholder avatar, index 1..=100
        let avatar_index = rand::thread_rng().gen_range(1..=100);
        Self {
            username,
            password: password_hash,
            profile: Some(format!(
                "https://avatar-placeholder.iran.liara.run/public/{}",
                avatar_index
            )),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Content record, owned by exactly one user for its whole lifetime.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub post_id: i64,
    pub body: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn retire(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub body: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(body: String, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            body,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// =====================================================================
// Request / response DTOs
// =====================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct UserSignUpRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserAuthenticateRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthenticationResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostCreateRequest {
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostUpdateRequest {
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
}
