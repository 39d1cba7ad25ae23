//! Key validation
//!
//! Keys must hash and compare by value. Most of that contract is enforced by
//! the `Hash + Eq` bound; `is_valid` covers the few values that satisfy the
//! bound but still cannot act as a key (an absent `Option`, a NaN float).

use std::hash::{Hash, Hasher};

/// A type usable as a cache key
///
/// `is_valid` runs before the cache lock is taken and must be a cheap,
/// side-effect free check of the key's shape.
pub trait CacheKey: Hash + Eq {
    /// Whether this particular value may be stored in the cache
    fn is_valid(&self) -> bool {
        true
    }
}

macro_rules! plain_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheKey for $ty {})*
    };
}

plain_keys!(
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    bool, char,
    String, Box<str>, &'static str,
);

/// `None` stands for "no key" and is always rejected
impl<K: CacheKey> CacheKey for Option<K> {
    fn is_valid(&self) -> bool {
        matches!(self, Some(key) if key.is_valid())
    }
}

impl<A: CacheKey, B: CacheKey> CacheKey for (A, B) {
    fn is_valid(&self) -> bool {
        self.0.is_valid() && self.1.is_valid()
    }
}

impl<A: CacheKey, B: CacheKey, C: CacheKey> CacheKey for (A, B, C) {
    fn is_valid(&self) -> bool {
        self.0.is_valid() && self.1.is_valid() && self.2.is_valid()
    }
}

/// Floating point key compared by bit pattern
///
/// `-0.0` and `0.0` are the same key. NaN is never a valid key: it is
/// unequal to itself, so an entry stored under it could never be found again.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    /// Wrap a float
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The wrapped float
    pub fn value(self) -> f64 {
        self.0
    }

    fn bits(self) -> u64 {
        if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl CacheKey for FloatKey {
    fn is_valid(&self) -> bool {
        !self.0.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_plain_keys_valid() {
        assert!(0u64.is_valid());
        assert!((-7i32).is_valid());
        assert!("".is_valid());
        assert!(String::from("segment-0001").is_valid());
        assert!('x'.is_valid());
    }

    #[test]
    fn test_option_key() {
        assert!(Some(1u32).is_valid());
        assert!(!None::<u32>.is_valid());
        assert!(!Some(FloatKey::new(f64::NAN)).is_valid());
    }

    #[test]
    fn test_tuple_key() {
        assert!((1u8, "a").is_valid());
        assert!(!(1u8, None::<u8>).is_valid());
        assert!(!(1u8, 2u8, FloatKey::new(f64::NAN)).is_valid());
    }

    #[test]
    fn test_float_key() {
        assert!(FloatKey::new(1.5).is_valid());
        assert!(FloatKey::from(f64::INFINITY).is_valid());
        assert!(!FloatKey::new(f64::NAN).is_valid());
        assert_eq!(FloatKey::new(2.25).value(), 2.25);
    }

    #[test]
    fn test_float_key_signed_zero() {
        assert_eq!(FloatKey::new(0.0), FloatKey::new(-0.0));

        let mut set = HashSet::new();
        set.insert(FloatKey::new(0.0));
        assert!(set.contains(&FloatKey::new(-0.0)));
        assert_ne!(FloatKey::new(1.0), FloatKey::new(-1.0));
    }
}
