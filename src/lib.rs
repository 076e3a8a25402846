//! Microblog service
//!
//! A small social-posting backend: user sign-up and stateless bearer-token
//! authentication, plus ownership-authorized CRUD over short text posts.
//! Storage is PostgreSQL with soft deletion throughout.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

use std::sync::Arc;

use db::{PostRepository, UserRepository};
use security::TokenCodec;
use services::{PostService, UserService};

/// Shared application state handed to every worker.
///
/// Repositories are behind trait objects so tests can swap in in-memory
/// implementations. Services are cheap to construct and built per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            users,
            posts,
            codec,
        }
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.users.clone(), self.codec.clone())
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(self.posts.clone(), self.users.clone())
    }
}
