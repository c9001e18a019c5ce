//! # Form Validation
//!
//! Input schemas for the two write paths (post, comment). Handlers parse the
//! raw request body into these structs, then call `validate` before touching
//! the store. Errors are keyed by field so templates can render them inline.

use std::collections::BTreeMap;

use uuid::Uuid;

/// Field-level validation messages, ordered by field name for stable display.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An image file lifted out of a multipart body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Submitted fields for creating or editing a post.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

impl PostForm {
    /// Text is required; group and image are optional. An attached file that
    /// is not an image is a field error, not a silent drop.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.text.trim().is_empty() {
            errors.add("text", "Post text is required.");
        }
        if let Some(image) = &self.image {
            if !image.content_type.starts_with("image/") {
                errors.add("image", "Attached file must be an image.");
            } else if image.data.is_empty() {
                errors.add("image", "Attached image is empty.");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Submitted fields for commenting on a post.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.text.trim().is_empty() {
            errors.add("text", "Comment text is required.");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
