//! # handlecache
//!
//! Thread-safe LRU cache for values that own external resources.
//!
//! ## Architecture
//! - **Index**: AHash map from key to list position (O(1))
//! - **Recency list**: circular doubly-linked list in a slab, with a sentinel (O(1))
//! - **Locking**: one mutex around both; `get` reorders, so it locks too
//! - **Release**: evicted handles are released after the lock is dropped
//!
//! ## Example
//! A write-ahead log can keep open segments in the cache and close their
//! files when they fall out:
//!
//! ```
//! use handlecache::{DataHandler, LruCache};
//!
//! struct Segment {
//!     id: u64,
//! }
//!
//! impl DataHandler for Segment {
//!     type Data = u64;
//!
//!     fn data(&self) -> u64 {
//!         self.id
//!     }
//!
//!     fn release(self) {
//!         // close log file and index here
//!     }
//! }
//!
//! let cache = LruCache::new(2);
//! cache.set(1u64, Segment { id: 1 }).unwrap();
//! cache.set(2u64, Segment { id: 2 }).unwrap();
//! cache.set(3u64, Segment { id: 3 }).unwrap(); // segment 1 is released
//!
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&3), Some(3));
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod handler;
mod key;
mod list;
mod stats;

pub use cache::LruCache;
pub use config::{CacheConfig, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use handler::DataHandler;
pub use key::{CacheKey, FloatKey};
pub use stats::CacheStats;
