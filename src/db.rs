// src/db.rs

use std::str::FromStr;

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    error::{AppError, is_foreign_key_violation, is_unique_violation},
    models::{
        post::{NewPost, Post},
        user::{NewUser, User},
    },
};

/// Persistence gateway for the dashboard.
///
/// Opened once at process start, handed around through `AppState`, disposed
/// at shutdown via [`Db::close`]. Every mutating operation runs one logical
/// operation inside its own transaction: commit on success, rollback when
/// the transaction is dropped on an error path. The pool reclaims the
/// connection either way.
#[derive(Clone)]
pub struct Db {
    pool: Pool<Sqlite>,
}

impl Db {
    /// Opens the store, creating the database file if needed, turns on
    /// foreign-key enforcement (the posts table cascades on user deletion)
    /// and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Disposes the pool. Call once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Startup probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// All users, most recently created first. A snapshot: the dashboard
    /// re-queries on every refresh rather than subscribing.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_on, verified, is_admin
            FROM users
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::from(e)
        })?;

        Ok(users)
    }

    /// Inserts a new user. A duplicate email rolls the transaction back and
    /// surfaces as `Conflict` for the dashboard to show.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, created_on, verified, is_admin)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, name, email, password_hash, created_on, verified, is_admin
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.created_on)
        .bind(new_user.verified)
        .bind(new_user.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already registered", new_user.email))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(user)
    }

    /// Deletes a user by id; the FK cascade drops the user's posts in the
    /// same transaction. Deleting an id that does not exist is an explicit
    /// `NotFound`, not a silent no-op.
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts a new post in draft state. An unknown owner trips the
    /// foreign key and surfaces as `NotFound`.
    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content, markdown, payload, created_on, is_draft)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(new_post.user_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(&new_post.markdown)
        .bind(&new_post.payload)
        .bind(new_post.created_on)
        .bind(new_post.is_draft)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound("User not found".to_string())
            } else {
                tracing::error!("Failed to create post: {:?}", e);
                AppError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(post)
    }

    /// Fetches a post by id. Soft-deleted posts are returned too: the
    /// deletion flags and timestamp are part of the record's story.
    pub async fn get_post(&self, id: i64) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

        Ok(post)
    }

    /// Non-deleted posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE is_deleted = 0
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::from(e)
        })?;

        Ok(posts)
    }

    /// Non-deleted posts owned by one user, newest first.
    pub async fn list_posts_for_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE user_id = ?1 AND is_deleted = 0
            ORDER BY id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Persists the fields a lifecycle transition can touch. `NotFound` if
    /// the row has been removed underneath us.
    pub async fn update_post(&self, post: &Post) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET
                title = ?1,
                content = ?2,
                markdown = ?3,
                payload = ?4,
                edited_on = ?5,
                published_on = ?6,
                unpublished_on = ?7,
                deleted_on = ?8,
                is_published = ?9,
                is_unpublished = ?10,
                is_deleted = ?11,
                is_draft = ?12,
                is_featured = ?13,
                is_visible_to_admins = ?14,
                is_visible_to_users = ?15,
                is_visible_to_visitors = ?16,
                is_visible_to_subscribers = ?17,
                is_visible_to_subscribers_tier_2 = ?18,
                is_visible_to_subscribers_tier_3 = ?19
            WHERE id = ?20
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.markdown)
        .bind(&post.payload)
        .bind(post.edited_on)
        .bind(post.published_on)
        .bind(post.unpublished_on)
        .bind(post.deleted_on)
        .bind(post.is_published)
        .bind(post.is_unpublished)
        .bind(post.is_deleted)
        .bind(post.is_draft)
        .bind(post.is_featured)
        .bind(post.is_visible_to_admins)
        .bind(post.is_visible_to_users)
        .bind(post.is_visible_to_visitors)
        .bind(post.is_visible_to_subscribers)
        .bind(post.is_visible_to_subscribers_tier_2)
        .bind(post.is_visible_to_subscribers_tier_3)
        .bind(post.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
