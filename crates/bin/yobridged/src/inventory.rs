//! File-backed device inventory.
//!
//! The file holds the JSON document returned by the vendor's device-list
//! call (`{"data": {"devices": [...]}}`), saved ahead of time.

use std::path::PathBuf;

use yobridge_app::ports::InventorySource;
use yobridge_domain::error::BridgeError;

/// [`InventorySource`] reading a JSON document from disk.
#[derive(Debug, Clone)]
pub struct FileInventory {
    path: PathBuf,
}

impl FileInventory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InventorySource for FileInventory {
    async fn load(&self) -> Result<serde_json::Value, BridgeError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|err| BridgeError::Inventory(Box::new(err)))?;
        let document =
            serde_json::from_slice(&bytes).map_err(|err| BridgeError::Inventory(Box::new(err)))?;
        tracing::debug!(path = %self.path.display(), "inventory loaded");
        Ok(document)
    }
}
