//! rusty-press/crates/rp-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Press.

pub mod error;
pub mod feed;
pub mod forms;
pub mod models;
pub mod rules;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_post_creation_v7() {
        let id = Uuid::now_v7();
        let author_id = Uuid::now_v7();
        let post = Post {
            id,
            author_id,
            group_id: None,
            text: "Hello Rust!".to_string(),
            image_id: None,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(post.id, id);
        assert_eq!(post.author_id, author_id);
        assert!(post.group_id.is_none());
    }
}
