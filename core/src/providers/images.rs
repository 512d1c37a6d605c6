//! Image storage trait.

use crate::error::Result;
use async_trait::async_trait;

/// Stores uploaded image bytes and hands back the filename to persist on
/// the entity. Resizing pipelines, when present, live behind this seam.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    /// Store `bytes` under a name derived from `name_hint`, returning the
    /// stored filename.
    async fn store_image(&self, bytes: &[u8], name_hint: &str) -> Result<String>;
}
