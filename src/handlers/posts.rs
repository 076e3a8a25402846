/// Post endpoints: listing, reads, and owner-scoped mutations.
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{PostCreateRequest, PostUpdateRequest};
use crate::AppState;

pub async fn get_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.post_service().get_posts().await?;

    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = state.post_service().get_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn create_post(
    state: web::Data<AppState>,
    payload: web::Json<PostCreateRequest>,
    current_user: AuthenticatedUser,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = state
        .post_service()
        .create_post(&payload.body, &current_user.0)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn update_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    payload: web::Json<PostUpdateRequest>,
    current_user: AuthenticatedUser,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = state
        .post_service()
        .update_post(*post_id, &payload.body, &current_user.0)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    current_user: AuthenticatedUser,
) -> Result<HttpResponse> {
    state
        .post_service()
        .delete_post(*post_id, &current_user.0)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
