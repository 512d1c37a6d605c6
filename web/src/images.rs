//! Filesystem image storage.

use async_trait::async_trait;
use std::path::PathBuf;
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::ImageProcessor;

/// Stores uploaded images under a directory on local disk.
#[derive(Debug, Clone)]
pub struct FsImages {
    dir: PathBuf,
}

impl FsImages {
    /// Build the store; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ImageProcessor for FsImages {
    async fn store_image(&self, bytes: &[u8], name_hint: &str) -> Result<String> {
        let filename = format!("{name_hint}.jpeg");
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Upstream(format!("image dir unavailable: {e}")))?;
        tokio::fs::write(self.dir.join(&filename), bytes)
            .await
            .map_err(|e| Error::Upstream(format!("image write failed: {e}")))?;
        Ok(filename)
    }
}
