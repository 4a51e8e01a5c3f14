// src/handlers/posts.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::types::Json as SqlJson;
use validator::Validate;

use crate::{
    db::Db,
    error::AppError,
    models::post::{Audience, CreatePostRequest, EditPostRequest, NewPost, PublishRequest},
    utils::html::clean_html,
};

/// Creates a post in draft state for the given owner.
/// Content passes through the sanitizer before it is stored.
pub async fn create_post(
    State(db): State<Db>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut new_post = NewPost::create(
        &payload.title,
        payload.user_id,
        &clean_html(&payload.content),
        payload.draft,
    );
    new_post.markdown = payload.markdown;
    new_post.payload = payload.payload.map(SqlJson);

    let post = db.create_post(&new_post).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Lists non-deleted posts, newest first.
pub async fn list_posts(State(db): State<Db>) -> Result<impl IntoResponse, AppError> {
    let posts = db.list_posts().await?;
    Ok(Json(posts))
}

/// Fetches a single post by id. Soft-deleted posts are included: the flags
/// and deletion timestamp tell the caller what happened to it.
pub async fn get_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = db.get_post(id).await?;
    Ok(Json(post))
}

/// Overwrites title, content and the draft flag and stamps the edit time.
pub async fn edit_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(payload): Json<EditPostRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut post = db.get_post(id).await?;
    post.edit(&payload.title, &clean_html(&payload.content), payload.draft);
    db.update_post(&post).await?;

    Ok(Json(post))
}

/// Publishes a post, optionally featuring it.
pub async fn publish_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(payload): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = db.get_post(id).await?;
    post.publish(payload.featured);
    db.update_post(&post).await?;

    Ok(Json(post))
}

/// Withdraws a published post back to an unpublished draft.
pub async fn unpublish_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = db.get_post(id).await?;
    post.unpublish();
    db.update_post(&post).await?;

    Ok(Json(post))
}

/// Soft-deletes a post. The record is retained; listings stop showing it.
pub async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = db.get_post(id).await?;
    post.soft_delete();
    db.update_post(&post).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Sets the audience visibility flags, one per tier.
pub async fn set_visibility(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(audience): Json<Audience>,
) -> Result<impl IntoResponse, AppError> {
    let mut post = db.get_post(id).await?;
    post.set_visibility(audience);
    db.update_post(&post).await?;

    Ok(Json(post))
}
