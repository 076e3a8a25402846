/// Post service: CRUD over posts with ownership authorization.
///
/// Mutating operations check existence first (404 semantics), then ownership
/// (403 semantics), and only then touch the record.
use std::sync::Arc;

use crate::db::{PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{NewPost, Post, User};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        self.posts.find_all().await
    }

    pub async fn get_posts_by_username(&self, username: &str) -> Result<Vec<Post>> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        self.posts.find_by_user(user.user_id).await
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))
    }

    pub async fn create_post(&self, body: &str, author: &User) -> Result<Post> {
        let post = self
            .posts
            .create(&NewPost::new(body.to_string(), author.user_id))
            .await
            .map_err(|e| match e {
                // A persistence failure is its own kind, distinct from validation.
                AppError::Database(detail) => AppError::PostCreationFailed(detail),
                other => other,
            })?;

        tracing::info!(post_id = post.post_id, user_id = author.user_id, "post created");
        Ok(post)
    }

    pub async fn update_post(&self, post_id: i64, body: &str, requester: &User) -> Result<Post> {
        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        if post.user_id != requester.user_id {
            return Err(AppError::UserNotAllowed);
        }

        post.body = body.to_string();
        post.touch();
        self.posts.update(&post).await
    }

    pub async fn delete_post(&self, post_id: i64, requester: &User) -> Result<()> {
        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        if post.user_id != requester.user_id {
            return Err(AppError::UserNotAllowed);
        }

        post.retire();
        self.posts.update(&post).await?;

        tracing::info!(post_id, user_id = requester.user_id, "post soft-deleted");
        Ok(())
    }
}
