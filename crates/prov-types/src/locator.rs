use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Canonical form of the zero-length block.
///
/// Every empty file and every empty collection references this content, so it
/// carries no useful lineage information.
pub const EMPTY_BLOCK_LOCATOR: &str = "d41d8cd98f00b204e9800998ecf8427e+0";

/// Length of the hex digest at the start of every locator.
const DIGEST_HEX_LEN: usize = 32;

/// Content address: an MD5 digest of some bytes, their length, and optional
/// storage hints.
///
/// Two locators refer to the same content if digest and size match. Hints
/// (replication, signatures, storage class) vary per copy and per site, so they
/// are preserved in the string form but ignored by `==` and `Hash`.
#[derive(Clone)]
pub struct Locator {
    digest: [u8; 16],
    size: u64,
    hints: Vec<String>,
}

impl Locator {
    /// Build a hint-free locator from a raw digest and size.
    pub fn from_parts(digest: [u8; 16], size: u64) -> Self {
        Self {
            digest,
            size,
            hints: Vec::new(),
        }
    }

    /// The locator of zero-length content.
    pub fn empty_block() -> Self {
        Self::from_parts(
            [
                0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec, 0xf8,
                0x42, 0x7e,
            ],
            0,
        )
    }

    /// Parse `hash+size[+hint]*`.
    ///
    /// Returns `None` when the string is not a locator; callers typically
    /// treat that as "probably an object UUID instead".
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('+');

        let hash = parts.next()?;
        if !is_digest(hash) {
            return None;
        }

        let size = parts.next()?;
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let size = size.parse::<u64>().ok()?;

        let mut hints = Vec::new();
        for hint in parts {
            // `[^,]+`: any non-empty run without a comma. Manifest tokens never
            // carry spaces because lines are split on them first.
            if hint.is_empty() || hint.contains(',') {
                return None;
            }
            hints.push(hint.to_string());
        }

        let mut digest = [0u8; 16];
        hex::decode_to_slice(hash, &mut digest).ok()?;
        Some(Self {
            digest,
            size,
            hints,
        })
    }

    /// Parse a locator optionally followed by `/path`.
    ///
    /// `"<hash>+3/dir/foo"` yields the locator and `Some("dir/foo")`. A bare
    /// trailing slash yields no path.
    pub fn parse_with_path(s: &str) -> Option<(Self, Option<&str>)> {
        match s.split_once('/') {
            Some((loc, path)) => {
                let loc = Self::parse(loc)?;
                let path = Some(path).filter(|p| !p.is_empty());
                Some((loc, path))
            }
            None => Self::parse(s).map(|loc| (loc, None)),
        }
    }

    /// A copy of this locator with all hints removed.
    ///
    /// This is the canonical grouping key: the same content stored at
    /// different sites must not fragment into several identities.
    pub fn strip_hints(&self) -> Self {
        Self::from_parts(self.digest, self.size)
    }

    /// Lowercase hex digest.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Raw digest bytes.
    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }

    /// Byte count of the referenced content.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }

    /// Returns `true` for the zero-length block, with or without hints.
    pub fn is_empty_block(&self) -> bool {
        *self == Self::empty_block()
    }

    /// Exact textual equality, hints included.
    pub fn identical(&self, other: &Self) -> bool {
        self == other && self.hints == other.hints
    }
}

fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl PartialEq for Locator {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.size == other.size
    }
}

impl Eq for Locator {}

impl Hash for Locator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
        self.size.hash(state);
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.digest_hex(), self.size)?;
        for hint in &self.hints {
            write!(f, "+{hint}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({self})")
    }
}

impl FromStr for Locator {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::NotALocator(s.to_string()))
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FOO: &str = "acbd18db4cc2f85cedef654fccc4a4d8+3";

    #[test]
    fn parses_plain_locator() {
        let loc = Locator::parse(FOO).unwrap();
        assert_eq!(loc.digest_hex(), "acbd18db4cc2f85cedef654fccc4a4d8");
        assert_eq!(loc.size(), 3);
        assert!(!loc.has_hints());
        assert_eq!(loc.to_string(), FOO);
    }

    #[test]
    fn preserves_hints_in_order() {
        let s = "acbd18db4cc2f85cedef654fccc4a4d8+3+K@zzzzz+Afeed@5441920c";
        let loc = Locator::parse(s).unwrap();
        assert_eq!(loc.hints(), ["K@zzzzz", "Afeed@5441920c"]);
        assert_eq!(loc.to_string(), s);
    }

    #[test]
    fn hints_allow_anything_but_commas() {
        let loc = Locator::parse(&format!("{FOO}+A sig@1\t+K@zzzzz")).unwrap();
        assert_eq!(loc.hints(), ["A sig@1\t", "K@zzzzz"]);
    }

    #[test]
    fn equality_ignores_hints() {
        let plain = Locator::parse(FOO).unwrap();
        let hinted = Locator::parse(&format!("{FOO}+K@zzzzz")).unwrap();
        assert_eq!(plain, hinted);
        assert!(!plain.identical(&hinted));
        assert!(hinted.strip_hints().identical(&plain));
    }

    #[test]
    fn rejects_non_locators() {
        for s in [
            "",
            "acbd18db4cc2f85cedef654fccc4a4d8",
            "acbd18db4cc2f85cedef654fccc4a4d8+",
            "ACBD18DB4CC2F85CEDEF654FCCC4A4D8+3",
            "acbd18db4cc2f85cedef654fccc4a4+3",
            "acbd18db4cc2f85cedef654fccc4a4d8+3x",
            "acbd18db4cc2f85cedef654fccc4a4d8+3+",
            "acbd18db4cc2f85cedef654fccc4a4d8+3+a,b",
            "zzzzz-4zz18-znfnqtbbv4spc3w",
        ] {
            assert!(Locator::parse(s).is_none(), "{s:?} should not parse");
        }
    }

    #[test]
    fn parse_with_path_splits_trailing_path() {
        let arg = format!("{FOO}/dir1/foo");
        let (loc, path) = Locator::parse_with_path(&arg).unwrap();
        assert_eq!(loc.to_string(), FOO);
        assert_eq!(path, Some("dir1/foo"));

        let arg2 = format!("{FOO}/");
        let (_, path) = Locator::parse_with_path(&arg2).unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn empty_block_is_well_known() {
        assert_eq!(Locator::empty_block().to_string(), EMPTY_BLOCK_LOCATOR);
        let hinted = Locator::parse(&format!("{EMPTY_BLOCK_LOCATOR}+K@zzzzz")).unwrap();
        assert!(hinted.is_empty_block());
        assert!(!Locator::parse(FOO).unwrap().is_empty_block());
    }

    #[test]
    fn from_str_reports_input() {
        let err = "nope".parse::<Locator>().unwrap_err();
        assert_eq!(err, TypeError::NotALocator("nope".into()));
    }

    #[test]
    fn serde_uses_string_form() {
        let loc = Locator::parse(FOO).unwrap();
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, format!("\"{FOO}\""));
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert!(back.identical(&loc));
    }

    proptest! {
        #[test]
        fn display_parse_is_identity(
            digest in proptest::array::uniform16(any::<u8>()),
            size in any::<u64>(),
            hints in proptest::collection::vec("[A-Za-z0-9@_-]{1,12}", 0..4),
        ) {
            let mut text = format!("{}+{}", hex::encode(digest), size);
            for h in &hints {
                text.push('+');
                text.push_str(h);
            }
            let loc = Locator::parse(&text).unwrap();
            prop_assert_eq!(loc.to_string(), text);
            prop_assert_eq!(loc.hints().len(), hints.len());
            prop_assert_eq!(loc.strip_hints(), loc);
        }
    }
}
