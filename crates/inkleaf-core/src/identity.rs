//! Per-device owner identity.
//!
//! The identity is created once, persisted, and used only as the namespace
//! prefix of document keys.

use crate::storage::{KeyValueStore, StorageResult};
use std::fmt;
use uuid::Uuid;

/// Storage key holding the device identity.
pub const DEVICE_ID_KEY: &str = "deviceId";

/// Prefix of generated identities.
const DEVICE_ID_PREFIX: &str = "student-";

/// Upper bound (exclusive) of the random suffix.
const DEVICE_ID_RANGE: u128 = 1_000_000_000;

/// Stable identifier of this device's document namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Load the persisted identity, creating and storing one on first run.
    pub fn ensure<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Self> {
        if let Some(existing) = store.get(DEVICE_ID_KEY)? {
            if !existing.is_empty() {
                return Ok(Self(existing));
            }
        }

        let identity = Self::generate();
        store.set(DEVICE_ID_KEY, identity.as_str())?;
        log::info!("Created device identity {}", identity);
        Ok(identity)
    }

    /// Generate a fresh identity (not persisted).
    pub fn generate() -> Self {
        let n = Uuid::new_v4().as_u128() % DEVICE_ID_RANGE;
        Self(format!("{}{}", DEVICE_ID_PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_generated_format() {
        let id = DeviceIdentity::generate();
        let suffix = id.as_str().strip_prefix("student-").unwrap();
        assert!(suffix.parse::<u64>().is_ok());
    }

    #[test]
    fn test_identity_is_stable() {
        let store = MemoryStore::new();
        let first = DeviceIdentity::ensure(&store).unwrap();
        let second = DeviceIdentity::ensure(&store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(DEVICE_ID_KEY).unwrap().as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_existing_identity_is_kept() {
        let store = MemoryStore::new();
        store.set(DEVICE_ID_KEY, "student-7").unwrap();
        assert_eq!(DeviceIdentity::ensure(&store).unwrap().as_str(), "student-7");
    }
}
