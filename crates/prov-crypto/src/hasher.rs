use md5::{Digest, Md5};
use prov_types::Locator;

/// Locator of a byte string: MD5 digest plus length, no hints.
pub fn block_locator(data: &[u8]) -> Locator {
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&Md5::digest(data));
    Locator::from_parts(digest, data.len() as u64)
}

/// Portable data hash of a manifest: `MD5(text) + "+" + byte_length(text)`.
///
/// The text must be the canonical serialized form; any difference in stream
/// order, escaping, or trailing newline produces a different hash.
pub fn portable_data_hash(manifest_text: &str) -> Locator {
    block_locator(manifest_text.as_bytes())
}

/// Returns `true` if `manifest_text` hashes to `expected` (hints ignored).
pub fn verify_portable_data_hash(manifest_text: &str, expected: &Locator) -> bool {
    portable_data_hash(manifest_text) == *expected
}
