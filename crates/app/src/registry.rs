//! Device registry: in-memory store of every device that went through
//! discovery.
//!
//! The map itself sits behind a `std::sync::RwLock` that is only held long
//! enough to clone an entry handle. Each entry has its own
//! `tokio::sync::Mutex`, so a read-modify-publish sequence on one device can
//! span an `.await` without blocking any other device.
//!
//! Entries are never removed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{Mutex, OwnedMutexGuard};

use yobridge_domain::device::DeviceDescriptor;
use yobridge_domain::discovery::{DiscoveryConfig, TopicBinding};
use yobridge_domain::id::DeviceId;

/// Everything the bridge knows about one registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub descriptor: DeviceDescriptor,
    pub config: DiscoveryConfig,
    pub binding: TopicBinding,
}

impl RegistryEntry {
    /// Replace the config's unit and return the updated config.
    pub fn set_unit(&mut self, unit: impl Into<String>) -> &DiscoveryConfig {
        self.config.set_unit(unit);
        &self.config
    }
}

/// Exclusive access to one registry entry, held until dropped.
pub type DeviceGuard = OwnedMutexGuard<RegistryEntry>;

/// In-memory device registry, shared via `Arc`.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<DeviceId, Arc<Mutex<RegistryEntry>>>>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the records for a device.
    ///
    /// Re-registering replaces the previous descriptor, config and binding.
    /// When the device is already known, the overwrite waits for any holder
    /// of its [`DeviceGuard`] to finish.
    pub async fn register(
        &self,
        descriptor: DeviceDescriptor,
        config: DiscoveryConfig,
        binding: TopicBinding,
    ) {
        let device_id = descriptor.device_id.clone();
        let entry = RegistryEntry {
            descriptor,
            config,
            binding,
        };

        let existing = {
            let mut devices = self.write();
            match devices.get(&device_id) {
                Some(slot) => Arc::clone(slot),
                None => {
                    devices.insert(device_id, Arc::new(Mutex::new(entry)));
                    return;
                }
            }
        };

        *existing.lock().await = entry;
    }

    /// Snapshot of a device's records, `None` if it was never registered.
    pub async fn lookup(&self, device_id: &DeviceId) -> Option<RegistryEntry> {
        let slot = self.slot(device_id)?;
        let entry = slot.lock().await;
        Some(entry.clone())
    }

    /// Lock a device's entry for a read-modify-write sequence.
    ///
    /// Two callers locking the same device are serialized; different
    /// devices never contend.
    pub async fn lock(&self, device_id: &DeviceId) -> Option<DeviceGuard> {
        let slot = self.slot(device_id)?;
        Some(slot.lock_owned().await)
    }

    /// Set the unit of measurement of a device's config.
    ///
    /// Returns the updated config, or `None` if the device is unknown.
    pub async fn update_unit(
        &self,
        device_id: &DeviceId,
        unit: impl Into<String>,
    ) -> Option<DiscoveryConfig> {
        let mut entry = self.lock(device_id).await?;
        Some(entry.set_unit(unit).clone())
    }

    #[must_use]
    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.read().contains_key(device_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered device ids, sorted.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<_> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn slot(&self, device_id: &DeviceId) -> Option<Arc<Mutex<RegistryEntry>>> {
        self.read().get(device_id).map(Arc::clone)
    }

    // A panic while holding the map lock cannot leave it half-written:
    // every write is a single insert.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<DeviceId, Arc<Mutex<RegistryEntry>>>> {
        self.devices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DeviceId, Arc<Mutex<RegistryEntry>>>> {
        self.devices.write().unwrap_or_else(PoisonError::into_inner)
    }
}
