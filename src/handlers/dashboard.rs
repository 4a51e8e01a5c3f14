// src/handlers/dashboard.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    db::Db,
    error::AppError,
    models::user::{CreateUserRequest, NewUser},
};

/// Lists all users, most recently created first.
/// The dashboard renders the result as cards and re-requests it after every
/// mutation instead of holding a live subscription.
pub async fn list_users(State(db): State<Db>) -> Result<impl IntoResponse, AppError> {
    let users = db.list_users().await?;
    Ok(Json(users))
}

/// Creates a user from the dashboard form.
///
/// Hashes the password with Argon2 before storing it.
/// Returns 201 Created and the user object (excluding the hash); a duplicate
/// email comes back as 409 with the message the page shows as a notification.
pub async fn create_user(
    State(db): State<Db>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let new_user = NewUser::create(
        &payload.name,
        &payload.email,
        &payload.password,
        payload.is_admin,
    )?;

    let user = db.create_user(&new_user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Deletes a user by id. 404 if the id does not exist; the user's posts go
/// with it via the cascade.
pub async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    db.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the posts owned by one user, newest first.
pub async fn list_user_posts(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let posts = db.list_posts_for_user(id).await?;
    Ok(Json(posts))
}
