//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Comment, CommentView, Follow, Group, Post, PostView, User};

/// Filter selecting which posts a feed query returns. All scopes share the
/// same ordering: creation timestamp descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post in the system.
    Global,
    /// Posts assigned to one group.
    Group(Uuid),
    /// Posts written by one author.
    Author(Uuid),
    /// Posts written by authors the given user follows.
    FollowedBy(Uuid),
}

/// Data persistence contract for users, groups, posts, comments, and follows.
#[async_trait]
pub trait BlogRepo: Send + Sync {
    // User Operations
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    // Group Operations
    async fn create_group(&self, group: Group) -> anyhow::Result<()>;
    async fn get_group(&self, slug: &str) -> anyhow::Result<Option<Group>>;
    async fn list_groups(&self) -> anyhow::Result<Vec<Group>>;

    // Post Operations
    async fn create_post(&self, post: Post) -> anyhow::Result<()>;
    async fn update_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    /// Like `get_post`, joined with the author/group display fields.
    async fn get_post_view(&self, id: Uuid) -> anyhow::Result<Option<PostView>>;
    /// No handler exposes deletion; this exists for administration and tests.
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()>;
    async fn count_posts_by_author(&self, author_id: Uuid) -> anyhow::Result<i64>;

    // Feed Operations (ordered created_at DESC, page-sliced)
    async fn list_feed(&self, scope: FeedScope, limit: i64, offset: i64)
        -> anyhow::Result<Vec<PostView>>;
    async fn count_feed(&self, scope: FeedScope) -> anyhow::Result<i64>;

    // Comment Operations (ordered created_at ASC)
    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()>;
    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>>;

    // Follow Operations
    async fn create_follow(&self, follow: Follow) -> anyhow::Result<()>;
    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool>;
    /// Deletes every (user, author) edge; returns how many rows went away.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<u64>;
}

/// Media storage contract for handling post image uploads.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes and returns a media_id for the Post model.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
    /// Returns the URL or path to the original media.
    fn get_url(&self, media_id: &str) -> String;
    /// Returns the URL or path to the thumbnail.
    fn get_thumbnail_url(&self, media_id: &str) -> String;
}

/// Identity contract: password hashing and session cookie tokens.
pub trait AuthProvider: Send + Sync {
    /// Hashes a password for storage (Argon2 PHC string).
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Mints a signed session token carrying the user id.
    fn issue_session(&self, user_id: Uuid) -> String;

    /// Returns the user id if the token's signature and expiry check out.
    fn verify_session(&self, token: &str) -> Option<Uuid>;
}

/// Whole-page response cache with a fixed TTL. Callers choose the key; the
/// index handler keys by request URL plus session token.
pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: String, body: String);
    /// Drops every entry regardless of age (test/admin hook).
    fn clear(&self);
}
