//! # rp-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rp-core` domain models. Schema lives in `migrations/` and is
//! applied on startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rp_core::models::{Comment, CommentView, Follow, Group, Post, PostView, User};
use rp_core::traits::{BlogRepo, FeedScope};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

pub struct SqliteBlogRepo {
    pool: SqlitePool,
}

// Helpers for UUID <-> BLOB conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn opt_uuid_to_blob(id: Option<Uuid>) -> Option<Vec<u8>> {
    id.map(uuid_to_blob)
}

impl SqliteBlogRepo {
    /// Connects, enables foreign-key enforcement, and applies migrations.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory SQLite database exists per connection; a larger pool
        // would hand each caller an empty schema.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
        group_id: row
            .get::<Option<Vec<u8>>, _>("group_id")
            .map(|b| blob_to_uuid(b.as_slice())),
        text: row.get("text"),
        image_id: row.get("image_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn post_view_from_row(row: &SqliteRow) -> PostView {
    PostView {
        post: post_from_row(row),
        author_username: row.get("author_username"),
        group_title: row.get("group_title"),
        group_slug: row.get("group_slug"),
    }
}

const FEED_SELECT: &str = "SELECT p.id, p.author_id, p.group_id, p.text, p.image_id, p.created_at, \
     u.username AS author_username, g.title AS group_title, g.slug AS group_slug \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN groups g ON g.id = p.group_id";

// created_at DESC with the v7 id as tie-breaker keeps pages deterministic
// when several posts land in the same instant.
const FEED_ORDER: &str = "ORDER BY p.created_at DESC, p.id DESC";

fn feed_filter(scope: &FeedScope) -> (&'static str, Option<Uuid>) {
    match scope {
        FeedScope::Global => ("", None),
        FeedScope::Group(id) => ("WHERE p.group_id = ?", Some(*id)),
        FeedScope::Author(id) => ("WHERE p.author_id = ?", Some(*id)),
        FeedScope::FollowedBy(id) => (
            "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?)",
            Some(*id),
        ),
    }
}

#[async_trait]
impl BlogRepo for SqliteBlogRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(user.id))
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_group(&self, group: Group) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO groups (id, title, slug, description, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(group.id))
        .bind(group.title)
        .bind(group.slug)
        .bind(group.description)
        .bind(group.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_group(&self, slug: &str) -> anyhow::Result<Option<Group>> {
        let row = sqlx::query("SELECT * FROM groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Group {
            id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
            title: row.get("title"),
            slug: row.get("slug"),
            description: row.get("description"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        let rows = sqlx::query("SELECT * FROM groups ORDER BY title ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Group {
                id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
                title: row.get("title"),
                slug: row.get("slug"),
                description: row.get("description"),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
            })
            .collect())
    }

    async fn create_post(&self, post: Post) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, group_id, text, image_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(post.id))
        .bind(uuid_to_blob(post.author_id))
        .bind(opt_uuid_to_blob(post.group_id))
        .bind(post.text)
        .bind(post.image_id)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Edits touch text/group/image only; author and created_at are immutable.
    async fn update_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query("UPDATE posts SET text = ?, group_id = ?, image_id = ? WHERE id = ?")
            .bind(&post.text)
            .bind(opt_uuid_to_blob(post.group_id))
            .bind(&post.image_id)
            .bind(uuid_to_blob(post.id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn get_post_view(&self, id: Uuid) -> anyhow::Result<Option<PostView>> {
        let sql = format!("{FEED_SELECT} WHERE p.id = ?");
        let row = sqlx::query(&sql)
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(post_view_from_row))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_posts_by_author(&self, author_id: Uuid) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM posts WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("cnt"))
    }

    async fn list_feed(
        &self,
        scope: FeedScope,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<PostView>> {
        let (filter, bind) = feed_filter(&scope);
        let sql = format!("{FEED_SELECT} {filter} {FEED_ORDER} LIMIT ? OFFSET ?");
        let mut query = sqlx::query(&sql);
        if let Some(id) = bind {
            query = query.bind(uuid_to_blob(id));
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(post_view_from_row).collect())
    }

    async fn count_feed(&self, scope: FeedScope) -> anyhow::Result<i64> {
        let (filter, bind) = feed_filter(&scope);
        let sql = format!("SELECT COUNT(*) AS cnt FROM posts p {filter}");
        let mut query = sqlx::query(&sql);
        if let Some(id) = bind {
            query = query.bind(uuid_to_blob(id));
        }
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.get("cnt"))
    }

    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, text, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(comment.id))
        .bind(uuid_to_blob(comment.post_id))
        .bind(uuid_to_blob(comment.author_id))
        .bind(comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Oldest first: comments read top-to-bottom as a conversation.
    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.author_id, c.text, c.created_at, \
             u.username AS author_username \
             FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = ? \
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(uuid_to_blob(post_id))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| CommentView {
                comment: Comment {
                    id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
                    post_id: blob_to_uuid(row.get::<Vec<u8>, _>("post_id").as_slice()),
                    author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
                    text: row.get("text"),
                    created_at: row.get::<DateTime<Utc>, _>("created_at"),
                },
                author_username: row.get("author_username"),
            })
            .collect())
    }

    async fn create_follow(&self, follow: Follow) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO follows (id, user_id, author_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(follow.id))
        .bind(uuid_to_blob(follow.user_id))
        .bind(uuid_to_blob(follow.author_id))
        .bind(follow.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn follow_exists(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM follows WHERE user_id = ? AND author_id = ?",
        )
        .bind(uuid_to_blob(user_id))
        .bind(uuid_to_blob(author_id))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("cnt") > 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(uuid_to_blob(user_id))
            .bind(uuid_to_blob(author_id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
