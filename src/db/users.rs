/// User repository
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a live user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All live users.
    async fn find_all(&self) -> Result<Vec<User>>;

    /// Live users whose username contains `fragment`, case-insensitively.
    async fn find_by_username_containing(&self, fragment: &str) -> Result<Vec<User>>;

    async fn create(&self, user: &NewUser) -> Result<User>;

    /// Persist the mutable fields of an existing user.
    async fn update(&self, user: &User) -> Result<User>;

    /// Retire a user; subsequent lookups no longer return the record.
    async fn soft_delete(&self, user: &User) -> Result<()>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "user_id, username, password, profile, description, created_at, updated_at, deleted_at";

/// Escape LIKE metacharacters so a search fragment matches literally.
fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND deleted_at IS NULL"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_username_containing(&self, fragment: &str) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username ILIKE '%' || $1 || '%' AND deleted_at IS NULL
            ORDER BY username
            "#
        ))
        .bind(escape_like(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.profile)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::UserDuplicated(user.username.clone())
            }
            _ => AppError::from(e),
        })?;

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, password = $3, profile = $4, description = $5,
                updated_at = $6, deleted_at = $7
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.profile)
        .bind(&user.description)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn soft_delete(&self, user: &User) -> Result<()> {
        sqlx::query(
            "UPDATE users SET deleted_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user.user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
