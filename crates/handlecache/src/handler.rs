//! Release-hook capability for cached values

/// A value stored in an [`LruCache`](crate::LruCache)
///
/// Handles typically own an external resource such as an open log file or
/// an on-disk index. The cache calls [`release`](DataHandler::release) when
/// the handle is evicted, always after its internal lock has been dropped.
///
/// ```
/// use handlecache::DataHandler;
///
/// struct Segment {
///     id: u64,
/// }
///
/// impl DataHandler for Segment {
///     type Data = u64;
///
///     fn data(&self) -> u64 {
///         self.id
///     }
///
///     fn release(self) {
///         // close files, unmap indexes, ...
///     }
/// }
/// ```
pub trait DataHandler {
    /// What [`LruCache::get`](crate::LruCache::get) hands back to readers
    type Data;

    /// Read accessor. Called under the cache lock, so it must not block or
    /// call back into the cache.
    fn data(&self) -> Self::Data;

    /// Free resources owned by this handle.
    ///
    /// Consumes the handle, so it runs at most once. Invoked only on
    /// eviction; a value replaced by `set` or taken out by `remove` is not
    /// released by the cache.
    fn release(self);
}
