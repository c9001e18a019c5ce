//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Press.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on `Group::title`, mirrored by a CHECK constraint in the schema.
pub const GROUP_TITLE_MAX: usize = 200;
/// Upper bound on `Group::slug`, mirrored by a CHECK constraint in the schema.
pub const GROUP_SLUG_MAX: usize = 20;

/// A registered author/reader account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string; never rendered.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A topical collection of posts (e.g., "rust", "cooking").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    /// The URL slug (e.g., "rust" for /group/rust/), unique across groups.
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// The fundamental unit of publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    /// Posts survive group deletion with this cleared (SET NULL).
    pub group_id: Option<Uuid>,
    pub text: String,
    /// Media ID handled by `MediaStore`, if an image was attached.
    pub image_id: Option<String>,
    /// Server-assigned at creation, immutable through edits.
    pub created_at: DateTime<Utc>,
}

/// A reader's reply under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A "user follows author" edge.
///
/// The follows table carries no uniqueness constraint over
/// (user_id, author_id); deduplication happens in the follow handler only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    /// The follower.
    pub user_id: Uuid,
    /// The followed author.
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A post joined with the display fields the feed templates need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author_username: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author_username: String,
}
