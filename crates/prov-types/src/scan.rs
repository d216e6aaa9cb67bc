//! Reference detection inside free-form strings.
//!
//! Job parameters, container mounts and similar payloads mention collections
//! as plain strings (`"keep:<hash>+<size>/input.fastq"`, a bare UUID, ...).
//! These helpers decide whether one such string refers to another node.

use crate::identity::{NodeId, ObjectUuid};
use crate::locator::Locator;

const DIGEST_HEX_LEN: usize = 32;
const UUID_LEN: usize = 27;
const COLLECTION_SEGMENT: &[u8] = b"4zz18";

/// Find the leftmost `[a-f0-9]{32}\+[0-9]+` substring and return it as a
/// hint-free locator.
///
/// Hints and any trailing path are not part of the match.
pub fn find_hash_reference(s: &str) -> Option<Locator> {
    let bytes = s.as_bytes();
    if bytes.len() < DIGEST_HEX_LEN + 2 {
        return None;
    }

    for start in 0..=bytes.len() - (DIGEST_HEX_LEN + 2) {
        let digest_end = start + DIGEST_HEX_LEN;
        if bytes[digest_end] != b'+' {
            continue;
        }
        if !bytes[start..digest_end]
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            continue;
        }
        let digits = bytes[digest_end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            continue;
        }
        // All matched bytes are ASCII, so these are char boundaries.
        if let Some(loc) = Locator::parse(&s[start..digest_end + 1 + digits]) {
            return Some(loc);
        }
    }
    None
}

/// Find the leftmost `[a-z0-9]{5}-4zz18-[a-z0-9]{15}` substring.
///
/// Only collection UUIDs are matched inside longer text, so paths such as
/// `"<uuid>/reads.fq"` or `"keep:<uuid>/x"` still resolve.
pub fn find_collection_uuid(s: &str) -> Option<ObjectUuid> {
    let bytes = s.as_bytes();
    if bytes.len() < UUID_LEN {
        return None;
    }

    for start in 0..=bytes.len() - UUID_LEN {
        let window = &bytes[start..start + UUID_LEN];
        if window[5] != b'-' || window[11] != b'-' || &window[6..11] != COLLECTION_SEGMENT {
            continue;
        }
        let alnum = |b: &u8| matches!(b, b'a'..=b'z' | b'0'..=b'9');
        if !window[..5].iter().all(alnum) || !window[12..].iter().all(alnum) {
            continue;
        }
        // All matched bytes are ASCII, so these are char boundaries.
        if let Some(uuid) = ObjectUuid::parse(&s[start..start + UUID_LEN]) {
            return Some(uuid);
        }
    }
    None
}

/// Classify a string as a reference to another lineage node.
///
/// A content hash anywhere in the string wins. Next, the whole string may be
/// a UUID of any kind. Last, a collection UUID may appear anywhere in it.
pub fn find_reference(s: &str) -> Option<NodeId> {
    if let Some(loc) = find_hash_reference(s) {
        return Some(NodeId::Hash(loc));
    }
    ObjectUuid::parse(s)
        .or_else(|| find_collection_uuid(s))
        .map(NodeId::Uuid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOO: &str = "acbd18db4cc2f85cedef654fccc4a4d8+3";

    #[test]
    fn finds_embedded_hash() {
        let loc = find_hash_reference(&format!("keep:{FOO}+K@zzzzz/reads.fastq")).unwrap();
        assert_eq!(loc.to_string(), FOO);
        assert!(!loc.has_hints());
    }

    #[test]
    fn leftmost_match_wins_inside_long_hex_run() {
        let s = format!("deadbeef{FOO}");
        assert_eq!(find_hash_reference(&s).unwrap().to_string(), FOO);
    }

    #[test]
    fn ignores_near_misses() {
        assert!(find_hash_reference("acbd18db4cc2f85cedef654fccc4a4d8+").is_none());
        assert!(find_hash_reference("acbd18db4cc2f85cedef654fccc4a4+3").is_none());
        assert!(find_hash_reference("ACBD18DB4CC2F85CEDEF654FCCC4A4D8+3").is_none());
        assert!(find_hash_reference("short").is_none());
        assert!(find_hash_reference("").is_none());
    }

    #[test]
    fn multibyte_text_is_safe() {
        let s = format!("résumé → {FOO} ✓");
        assert_eq!(find_hash_reference(&s).unwrap().to_string(), FOO);
    }

    #[test]
    fn whole_string_uuid_of_any_kind() {
        assert!(matches!(
            find_reference("zzzzz-4zz18-znfnqtbbv4spc3w"),
            Some(NodeId::Uuid(_))
        ));
        assert_eq!(
            find_reference("zzzzz-8i9sb-znfnqtbbv4spc3w").unwrap().key(),
            "zzzzz-8i9sb-znfnqtbbv4spc3w"
        );
        assert!(find_reference("see zzzzz-8i9sb-znfnqtbbv4spc3w").is_none());
    }

    #[test]
    fn collection_uuid_inside_text() {
        for s in [
            "zzzzz-4zz18-znfnqtbbv4spc3w/reads.fq",
            "keep:zzzzz-4zz18-znfnqtbbv4spc3w/x",
            "see zzzzz-4zz18-znfnqtbbv4spc3w",
        ] {
            assert_eq!(
                find_reference(s).unwrap().key(),
                "zzzzz-4zz18-znfnqtbbv4spc3w",
                "{s}"
            );
        }
        assert!(find_collection_uuid("zzzzz-4zz18-znfnqtbbv4spc").is_none());
        assert!(find_collection_uuid("ZZZZZ-4zz18-znfnqtbbv4spc3w").is_none());
        assert_eq!(
            find_collection_uuid("résumé zzzzz-4zz18-znfnqtbbv4spc3w").unwrap().to_string(),
            "zzzzz-4zz18-znfnqtbbv4spc3w"
        );
    }

    #[test]
    fn hash_takes_precedence() {
        assert!(matches!(find_reference(FOO), Some(NodeId::Hash(_))));
    }
}
