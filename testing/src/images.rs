//! In-memory image store for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use trailbound_core::error::Result;
use trailbound_core::providers::ImageProcessor;

/// Image store that keeps bytes in a map and names files after the hint.
#[derive(Debug, Default)]
pub struct InMemoryImages {
    stored: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryImages {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `filename`, if any.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        self.stored.lock().ok()?.get(filename).cloned()
    }
}

#[async_trait]
impl ImageProcessor for InMemoryImages {
    async fn store_image(&self, bytes: &[u8], name_hint: &str) -> Result<String> {
        let filename = format!("{name_hint}.jpeg");
        if let Ok(mut stored) = self.stored.lock() {
            stored.insert(filename.clone(), bytes.to_vec());
        }
        Ok(filename)
    }
}
