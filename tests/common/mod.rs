/// Shared test fixtures: in-memory repositories and app construction helpers.
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use microblog_service::db::{PostRepository, UserRepository};
use microblog_service::error::{AppError, Result};
use microblog_service::models::{NewPost, NewUser, Post, User};
use microblog_service::security::TokenCodec;
use microblog_service::AppState;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username == username && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_username_containing(&self, fragment: &str) -> Result<Vec<User>> {
        let needle = fragment.to_lowercase();
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.deleted_at.is_none() && u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == user.username && u.deleted_at.is_none())
        {
            return Err(AppError::UserDuplicated(user.username.clone()));
        }

        let created = User {
            user_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: user.username.clone(),
            password: user.password.clone(),
            profile: user.profile.clone(),
            description: None,
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: None,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
            .ok_or_else(|| AppError::UserNotFound(user.username.clone()))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn soft_delete(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(slot) = users.iter_mut().find(|u| u.user_id == user.user_id) {
            let now = Utc::now();
            slot.deleted_at = Some(now);
            slot.updated_at = now;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
    next_id: AtomicI64,
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>> {
        let posts = self.posts.lock().unwrap();
        let mut live: Vec<Post> = posts
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by(|a, b| (b.created_at, b.post_id).cmp(&(a.created_at, a.post_id)));
        Ok(live)
    }

    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .find(|p| p.post_id == post_id && p.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let posts = self.posts.lock().unwrap();
        let mut live: Vec<Post> = posts
            .iter()
            .filter(|p| p.user_id == user_id && p.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by(|a, b| (b.created_at, b.post_id).cmp(&(a.created_at, a.post_id)));
        Ok(live)
    }

    async fn create(&self, post: &NewPost) -> Result<Post> {
        let mut posts = self.posts.lock().unwrap();
        let created = Post {
            post_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            body: post.body.clone(),
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            deleted_at: None,
        };
        posts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let mut posts = self.posts.lock().unwrap();
        let slot = posts
            .iter_mut()
            .find(|p| p.post_id == post.post_id)
            .ok_or(AppError::PostNotFound(post.post_id))?;
        *slot = post.clone();
        Ok(post.clone())
    }
}

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryPostRepository::default()),
        Arc::new(TokenCodec::new(b"integration-test-signing-key-32b", 3 * 60 * 60)),
    )
}

pub fn post_json(uri: &str, body: serde_json::Value) -> actix_web::test::TestRequest {
    actix_web::test::TestRequest::post().uri(uri).set_json(body)
}

pub fn bearer(
    req: actix_web::test::TestRequest,
    token: &str,
) -> actix_web::test::TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}
