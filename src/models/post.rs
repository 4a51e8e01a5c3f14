use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

/// Represents the 'posts' table in the database.
///
/// A post is always in exactly one of the four lifecycle states reported by
/// [`Post::status`]; the transition methods keep the underlying flags
/// consistent with that.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    /// Owning user, foreign key into 'users'.
    pub user_id: i64,

    pub title: String,
    pub content: String,

    /// Markdown source the content was authored from, if any.
    pub markdown: Option<String>,

    /// Arbitrary structured payload attached by clients.
    pub payload: Option<Json<serde_json::Value>>,

    pub created_on: DateTime<Utc>,
    pub edited_on: Option<DateTime<Utc>>,
    pub published_on: Option<DateTime<Utc>>,
    pub unpublished_on: Option<DateTime<Utc>>,
    pub deleted_on: Option<DateTime<Utc>>,

    pub is_published: bool,
    pub is_unpublished: bool,
    pub is_deleted: bool,
    pub is_draft: bool,
    pub is_featured: bool,

    pub is_visible_to_admins: bool,
    pub is_visible_to_users: bool,
    pub is_visible_to_visitors: bool,
    pub is_visible_to_subscribers: bool,
    pub is_visible_to_subscribers_tier_2: bool,
    pub is_visible_to_subscribers_tier_3: bool,
}

/// The audience tiers a post can be shown to, one field per flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Audience {
    pub admins: bool,
    pub users: bool,
    pub visitors: bool,
    pub subscribers: bool,
    pub subscribers_tier_2: bool,
    pub subscribers_tier_3: bool,
}

/// Lifecycle state derived from the flags, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Unpublished,
    Deleted,
}

impl Post {
    /// Overwrites title, content and the draft flag and stamps the edit
    /// time. Publication and visibility flags are untouched.
    pub fn edit(&mut self, title: &str, content: &str, draft: bool) {
        self.title = title.to_owned();
        self.content = content.to_owned();
        self.is_draft = draft;
        self.edited_on = Some(Utc::now());
    }

    /// Publishes the post, optionally featuring it. Clears a previous
    /// unpublication so the flags describe a single state.
    pub fn publish(&mut self, featured: bool) {
        self.is_published = true;
        self.is_draft = false;
        self.is_unpublished = false;
        self.is_featured = featured;
        self.published_on = Some(Utc::now());
    }

    /// Takes the post back to an unpublished draft, stamping when it was
    /// withdrawn.
    pub fn unpublish(&mut self) {
        self.is_published = false;
        self.is_draft = true;
        self.is_unpublished = true;
        self.unpublished_on = Some(Utc::now());
    }

    /// Soft delete: flips the flags, hides the post from every audience and
    /// stamps the deletion time. The record is retained and stays
    /// retrievable by id.
    pub fn soft_delete(&mut self) {
        self.is_published = false;
        self.is_draft = false;
        self.is_deleted = true;
        self.set_visibility(Audience::default());
        self.deleted_on = Some(Utc::now());
    }

    /// Assigns every visibility flag from its own field.
    pub fn set_visibility(&mut self, audience: Audience) {
        self.is_visible_to_admins = audience.admins;
        self.is_visible_to_users = audience.users;
        self.is_visible_to_visitors = audience.visitors;
        self.is_visible_to_subscribers = audience.subscribers;
        self.is_visible_to_subscribers_tier_2 = audience.subscribers_tier_2;
        self.is_visible_to_subscribers_tier_3 = audience.subscribers_tier_3;
    }

    pub fn status(&self) -> PostStatus {
        if self.is_deleted {
            PostStatus::Deleted
        } else if self.is_published {
            PostStatus::Published
        } else if self.is_unpublished {
            PostStatus::Unpublished
        } else {
            PostStatus::Draft
        }
    }
}

/// A post that has not been persisted yet. Starts in draft state with no
/// audience visibility.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub markdown: Option<String>,
    pub payload: Option<Json<serde_json::Value>>,
    pub created_on: DateTime<Utc>,
    pub is_draft: bool,
}

impl NewPost {
    pub fn create(title: &str, user_id: i64, content: &str, draft: bool) -> Self {
        Self {
            user_id,
            title: title.to_owned(),
            content: content.to_owned(),
            markdown: None,
            payload: None,
            created_on: Utc::now(),
            is_draft: draft,
        }
    }
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    pub user_id: i64,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Title length must be between 1 and 255 chars"
    ))]
    pub title: String,

    #[validate(length(max = 10000, message = "Content length must be at most 10000 chars"))]
    pub content: String,

    pub markdown: Option<String>,

    pub payload: Option<serde_json::Value>,

    /// Posts are created as drafts unless explicitly asked otherwise.
    #[serde(default = "default_draft")]
    pub draft: bool,
}

fn default_draft() -> bool {
    true
}

/// DTO for editing an existing post.
#[derive(Debug, Deserialize, Validate)]
pub struct EditPostRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title length must be between 1 and 255 chars"
    ))]
    pub title: String,

    #[validate(length(max = 10000, message = "Content length must be at most 10000 chars"))]
    pub content: String,

    #[serde(default = "default_draft")]
    pub draft: bool,
}

/// DTO for publishing a post.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub featured: bool,
}
