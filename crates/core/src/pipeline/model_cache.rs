use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::shared::device::Device;

/// Cache key: which model, on which backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub identifier: String,
    pub device: Device,
}

impl ModelKey {
    pub fn new(identifier: impl Into<String>, device: Device) -> Self {
        Self {
            identifier: identifier.into(),
            device,
        }
    }
}

/// Keyed cache for loaded model handles.
///
/// Repeated lookups with the same `(identifier, device)` pair return the
/// same `Arc` handle instead of reloading. No eviction; handles live as
/// long as the cache (one engine lifetime).
pub struct ModelCache<T> {
    slots: Mutex<HashMap<ModelKey, Arc<T>>>,
}

impl<T> ModelCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `key`, loading it with `load` on first
    /// use. The lock is held across the load so a key is never loaded twice.
    pub fn get_or_load<F>(
        &self,
        key: &ModelKey,
        load: F,
    ) -> Result<Arc<T>, Box<dyn std::error::Error + Send + Sync>>
    where
        F: FnOnce() -> Result<T, Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut slots = self.slots.lock().map_err(|_| "model cache lock poisoned")?;
        if let Some(handle) = slots.get(key) {
            return Ok(handle.clone());
        }
        let handle = Arc::new(load()?);
        slots.insert(key.clone(), handle.clone());
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ModelCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_same_key_returns_same_handle() {
        let cache: ModelCache<String> = ModelCache::new();
        let key = ModelKey::new("model-a", Device::Cpu);
        let loads = AtomicUsize::new(0);

        let first = cache
            .get_or_load(&key, || {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("handle".to_string())
            })
            .unwrap();
        let second = cache
            .get_or_load(&key, || {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("other".to_string())
            })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_devices_are_distinct_entries() {
        let cache: ModelCache<String> = ModelCache::new();
        cache
            .get_or_load(&ModelKey::new("model-a", Device::Cpu), || Ok("cpu".into()))
            .unwrap();
        cache
            .get_or_load(&ModelKey::new("model-a", Device::Cuda), || Ok("cuda".into()))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache: ModelCache<String> = ModelCache::new();
        let key = ModelKey::new("model-a", Device::Cpu);

        let result = cache.get_or_load(&key, || Err("load failed".into()));
        assert!(result.is_err());
        assert!(cache.is_empty());

        let retry = cache.get_or_load(&key, || Ok("handle".into()));
        assert!(retry.is_ok());
    }
}
