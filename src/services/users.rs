/// User directory service: sign-up, authentication, search, profile updates.
use std::sync::Arc;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{AuthenticationResponse, NewUser, User, UserUpdateRequest};
use crate::security::{password, TokenCodec};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }

    pub async fn sign_up(&self, username: &str, password_plain: &str) -> Result<User> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::UserDuplicated(username.to_string()));
        }

        let password_hash = password::hash_password(password_plain)?;
        let user = self
            .users
            .create(&NewUser::new(username.to_string(), password_hash))
            .await?;

        tracing::info!(%username, "user signed up");
        Ok(user)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// An unknown username and a wrong password produce the identical error so
    /// the response does not reveal which of the two was wrong.
    pub async fn authenticate(
        &self,
        username: &str,
        password_plain: &str,
    ) -> Result<AuthenticationResponse> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if !password::verify_password(password_plain, &user.password) {
            return Err(AppError::UserNotFound(username.to_string()));
        }

        let access_token = self.codec.issue(&user.username)?;

        tracing::info!(%username, "user authenticated");
        Ok(AuthenticationResponse { access_token })
    }

    pub async fn get_users(&self, query: Option<&str>) -> Result<Vec<User>> {
        match query {
            Some(fragment) if !fragment.trim().is_empty() => {
                self.users.find_by_username_containing(fragment).await
            }
            _ => self.users.find_all().await,
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Update a profile. Existence is checked before ownership so an unknown
    /// username stays a 404 for everyone.
    pub async fn update_user(
        &self,
        username: &str,
        request: &UserUpdateRequest,
        current_user: &User,
    ) -> Result<User> {
        let mut user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if user.user_id != current_user.user_id {
            return Err(AppError::UserNotAllowed);
        }

        if let Some(description) = &request.description {
            user.description = Some(description.clone());
            user.touch();
            user = self.users.update(&user).await?;
        }

        Ok(user)
    }
}
