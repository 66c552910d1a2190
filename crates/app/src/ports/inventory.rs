//! Inventory port: where the vendor device list comes from.

use std::future::Future;

use yobridge_domain::error::BridgeError;

/// Supplies the vendor inventory document (`{"data": {"devices": [...]}}`).
pub trait InventorySource {
    /// Fetch the current inventory.
    fn load(&self) -> impl Future<Output = Result<serde_json::Value, BridgeError>> + Send;
}
