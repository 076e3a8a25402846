/// User endpoints: sign-up, authentication, directory reads, profile updates.
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{
    UserAuthenticateRequest, UserSearchQuery, UserSignUpRequest, UserUpdateRequest,
};
use crate::AppState;

pub async fn sign_up(
    state: web::Data<AppState>,
    payload: web::Json<UserSignUpRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .user_service()
        .sign_up(&payload.username, &payload.password)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

pub async fn authenticate(
    state: web::Data<AppState>,
    payload: web::Json<UserAuthenticateRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = state
        .user_service()
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_users(
    state: web::Data<AppState>,
    query: web::Query<UserSearchQuery>,
) -> Result<HttpResponse> {
    let users = state.user_service().get_users(query.query.as_deref()).await?;

    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = state.user_service().get_user(&username).await?;

    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_user(
    state: web::Data<AppState>,
    username: web::Path<String>,
    payload: web::Json<UserUpdateRequest>,
    current_user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state
        .user_service()
        .update_user(&username, &payload, &current_user.0)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

pub async fn get_user_posts(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let posts = state.post_service().get_posts_by_username(&username).await?;

    Ok(HttpResponse::Ok().json(posts))
}
