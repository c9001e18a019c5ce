//! # rp-storage-local
//!
//! Local filesystem implementation of `MediaStore` for post images.
//! Uploads are content-addressed (SHA-256) under an `uploads/posts/` prefix,
//! with a WebP thumbnail generated next to the original for feed pages.

use async_trait::async_trait;
use image::io::Reader as ImageReader;
use rp_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory under the storage root where post images land.
const POSTS_DIR: &str = "posts";
const THUMB_EDGE: u32 = 300;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/media")
    url_prefix: String,
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "img",
    }
}

/// "abc123.png" -> "abc123"
fn stem(media_id: &str) -> &str {
    media_id.rsplit_once('.').map(|(s, _)| s).unwrap_or(media_id)
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    fn media_path(&self, media_id: &str) -> PathBuf {
        self.root_path.join(POSTS_DIR).join(media_id)
    }

    fn thumb_name(media_id: &str) -> String {
        format!("thumb_{}.webp", stem(media_id))
    }

    async fn write_thumbnail(&self, original: &Path, media_id: &str) -> anyhow::Result<()> {
        let data = fs::read(original).await?;
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        let thumb = img.thumbnail(THUMB_EDGE, THUMB_EDGE);
        let thumb_path = self
            .root_path
            .join(POSTS_DIR)
            .join(Self::thumb_name(media_id));
        thumb.save_with_format(thumb_path, image::ImageFormat::WebP)?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under its SHA-256 hash, which deduplicates identical
    /// files across posts. Returns the media_id stored on the Post.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());
        let media_id = format!("{}.{}", &hash[..16], extension_for(content_type));

        let target = self.media_path(&media_id);
        fs::create_dir_all(target.parent().expect("media path has a parent")).await?;

        if fs::try_exists(&target).await? {
            return Ok(media_id);
        }
        fs::write(&target, &data).await?;
        self.write_thumbnail(&target, &media_id).await?;
        Ok(media_id)
    }

    fn get_url(&self, media_id: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, POSTS_DIR, media_id)
    }

    fn get_thumbnail_url(&self, media_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url_prefix,
            POSTS_DIR,
            Self::thumb_name(media_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(8, 8, Rgb::<u8>([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn temp_store() -> LocalMediaStore {
        let root = std::env::temp_dir().join(format!("rp-media-{}", uuid::Uuid::now_v7()));
        LocalMediaStore::new(root, "/static/media".to_string())
    }

    #[tokio::test]
    async fn saves_original_and_thumbnail() {
        let store = temp_store();
        let media_id = store.save_upload(png_bytes(), "image/png").await.unwrap();
        assert!(media_id.ends_with(".png"));
        assert!(store.media_path(&media_id).exists());
        assert!(store
            .root_path
            .join(POSTS_DIR)
            .join(LocalMediaStore::thumb_name(&media_id))
            .exists());
    }

    #[tokio::test]
    async fn identical_uploads_share_one_media_id() {
        let store = temp_store();
        let first = store.save_upload(png_bytes(), "image/png").await.unwrap();
        let second = store.save_upload(png_bytes(), "image/png").await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn urls_point_under_the_public_prefix() {
        let store = temp_store();
        assert_eq!(
            store.get_url("abcd1234.png"),
            "/static/media/posts/abcd1234.png"
        );
        assert_eq!(
            store.get_thumbnail_url("abcd1234.png"),
            "/static/media/posts/thumb_abcd1234.webp"
        );
    }
}
