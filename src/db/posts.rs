/// Post repository
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::{NewPost, Post};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All live posts, newest first.
    async fn find_all(&self) -> Result<Vec<Post>>;

    /// A live post by id.
    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>>;

    /// Live posts owned by `user_id`, newest first.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Post>>;

    async fn create(&self, post: &NewPost) -> Result<Post>;

    /// Persist the mutable fields of an existing post.
    /// Soft deletion is an update that sets `deleted_at`.
    async fn update(&self, post: &Post) -> Result<Post>;
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "post_id, body, user_id, created_at, updated_at, deleted_at";

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1 AND deleted_at IS NULL"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn create(&self, post: &NewPost) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&post.body)
        .bind(post.user_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET body = $2, updated_at = $3, deleted_at = $4
            WHERE post_id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.post_id)
        .bind(&post.body)
        .bind(post.updated_at)
        .bind(post.deleted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }
}
