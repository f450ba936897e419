use murmur3::murmur3_x64_128;
use std::io::Cursor;

/// Seed mixed into every fingerprint computed by the default hasher.
pub const SALT_CONSTANT: u32 = 0x97c2_9b3a;

/// 128-bit hash of an item, split into the bucket seed and the stored value.
///
/// `locator` picks the first candidate bucket. `tag` is what actually lands in
/// the table, and it also derives every following bucket of a displacement
/// chain (`next = (index ^ tag) % size_k`).
///
/// A `tag` of `0` marks an empty slot. An item whose tag happens to hash to
/// exactly `0` can therefore never be stored or found; with a 64-bit tag this
/// is a 2^-64 event and is accepted as part of the approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub locator: u64,
    pub tag: u64,
}

impl Fingerprint {
    pub fn new(locator: u64, tag: u64) -> Self {
        Self { locator, tag }
    }
}

/// A type alias for the function turning raw bytes into a [`Fingerprint`].
///
/// **Parameters:**
///
/// - `item: &[u8]`
///   - The bytes to fingerprint.
/// - `seed: u32`
///   - Hash seed, taken from [`FilterConfig::hash_seed`](crate::FilterConfig).
///
/// The function must be deterministic for a given seed for the lifetime of a
/// filter, otherwise lookups stop matching earlier inserts. It does not need
/// to be cryptographically strong.
pub type FingerprintFunction = fn(&[u8], u32) -> Fingerprint;

pub(crate) fn hash_murmur128(key: &[u8], seed: u32) -> u128 {
    let mut cursor = Cursor::new(key);
    murmur3_x64_128(&mut cursor, seed).expect("Failed to compute Murmur3 hash")
}

/// MurmurHash3 x64/128: low half is the locator, high half the tag.
pub fn default_fingerprint_function(item: &[u8], seed: u32) -> Fingerprint {
    let hash = hash_murmur128(item, seed);
    Fingerprint {
        locator: hash as u64,
        tag: (hash >> 64) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = default_fingerprint_function(b"apple", SALT_CONSTANT);
        let b = default_fingerprint_function(b"apple", SALT_CONSTANT);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_fingerprint() {
        let a = default_fingerprint_function(b"apple", SALT_CONSTANT);
        let b = default_fingerprint_function(b"apple", SALT_CONSTANT ^ 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_distinct_items_get_distinct_tags() {
        let tags: std::collections::HashSet<u64> = (0..1000)
            .map(|i| {
                default_fingerprint_function(
                    format!("item_{i}").as_bytes(),
                    SALT_CONSTANT,
                )
                .tag
            })
            .collect();
        assert_eq!(tags.len(), 1000);
    }

    #[test]
    fn test_halves_come_from_one_hash() {
        let hash = hash_murmur128(b"banana", SALT_CONSTANT);
        let fp = default_fingerprint_function(b"banana", SALT_CONSTANT);
        assert_eq!(fp.locator, hash as u64);
        assert_eq!(fp.tag, (hash >> 64) as u64);
    }
}
