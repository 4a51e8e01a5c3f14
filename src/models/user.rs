// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::utils::hash::{hash_password, verify_password};

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub name: String,

    /// Unique across all users; enforced by the store's constraint.
    pub email: String,

    /// Argon2 password hash. The plaintext is hashed on the way in and
    /// never stored; skipped during serialization to prevent leaking
    /// sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub created_on: DateTime<Utc>,

    pub verified: bool,

    pub is_admin: bool,
}

impl User {
    /// Checks a candidate password against the stored hash.
    pub fn check_password(&self, candidate: &str) -> Result<bool, AppError> {
        verify_password(candidate, &self.password_hash)
    }
}

/// A user record that has not been persisted yet.
/// The store assigns the id on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_on: DateTime<Utc>,
    pub verified: bool,
    pub is_admin: bool,
}

impl NewUser {
    /// Builds a user from the dashboard form fields, deriving the password
    /// hash and stamping the creation time. No email format or uniqueness
    /// checks here: format lives in the request DTO, uniqueness in the store.
    pub fn create(
        name: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<Self, AppError> {
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: hash_password(password)?,
            created_on: Utc::now(),
            verified: false,
            is_admin,
        })
    }
}

/// DTO for creating a user from the dashboard form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name length must be between 1 and 255 characters."
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,

    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,

    #[serde(default)]
    pub is_admin: bool,
}
