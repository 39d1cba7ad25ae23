//! Cache construction parameters

use serde::{Deserialize, Serialize};

/// Default number of entries
pub const DEFAULT_CAPACITY: usize = 1024;

/// Settings for building an [`LruCache`](crate::LruCache)
///
/// Deserializable so an embedding system can keep it in its own config
/// file:
///
/// ```
/// use handlecache::CacheConfig;
///
/// let config: CacheConfig = serde_json::from_str(r#"{ "capacity": 64 }"#).unwrap();
/// assert_eq!(config.capacity, 64);
/// assert!(config.preallocate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries. Zero is allowed: every new entry is
    /// evicted as soon as it is set.
    pub capacity: usize,

    /// Reserve index and list storage for `capacity` entries up front
    pub preallocate: bool,
}

impl CacheConfig {
    /// Config with the given capacity and default settings otherwise
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            preallocate: true,
        }
    }
}
