use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::locator::Locator;

/// Lengths of the three dash-separated UUID segments.
const SEGMENT_LENS: [usize; 3] = [5, 5, 15];

/// Opaque object identifier, e.g. `zzzzz-4zz18-znfnqtbbv4spc3w`.
///
/// The first segment names the issuing cluster, the second encodes the
/// resource type, the third is unique within that cluster and type. All
/// characters are lowercase ASCII alphanumerics.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectUuid(String);

impl ObjectUuid {
    /// Parse a UUID, returning `None` if the string is not exactly one UUID.
    pub fn parse(s: &str) -> Option<Self> {
        let mut segments = s.split('-');
        for len in SEGMENT_LENS {
            let seg = segments.next()?;
            if seg.len() != len
                || !seg
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            {
                return None;
            }
        }
        if segments.next().is_some() {
            return None;
        }
        Some(Self(s.to_string()))
    }

    /// The issuing cluster prefix.
    pub fn cluster(&self) -> &str {
        &self.0[..5]
    }

    /// The embedded resource type segment.
    pub fn type_segment(&self) -> &str {
        &self.0[6..11]
    }

    /// The resource kind declared by the type segment.
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_type_segment(self.type_segment())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectUuid({})", self.0)
    }
}

impl FromStr for ObjectUuid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::InvalidUuid(s.to_string()))
    }
}

impl Serialize for ObjectUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Resource kind declared by a UUID's type segment.
///
/// Derived once per UUID and matched exhaustively by the lineage walker.
/// Unrecognized segments are kept verbatim in [`ResourceKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Job,
    Collection,
    Container,
    ContainerRequest,
    Link,
    Other(String),
}

impl ResourceKind {
    pub fn from_type_segment(segment: &str) -> Self {
        match segment {
            "8i9sb" => Self::Job,
            "4zz18" => Self::Collection,
            "dz642" => Self::Container,
            "xvhdp" => Self::ContainerRequest,
            "o0j2j" => Self::Link,
            other => Self::Other(other.to_string()),
        }
    }

    /// The type segment that identifies this kind inside a UUID.
    pub fn type_segment(&self) -> &str {
        match self {
            Self::Job => "8i9sb",
            Self::Collection => "4zz18",
            Self::Container => "dz642",
            Self::ContainerRequest => "xvhdp",
            Self::Link => "o0j2j",
            Self::Other(segment) => segment,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Job => write!(f, "job"),
            Self::Collection => write!(f, "collection"),
            Self::Container => write!(f, "container"),
            Self::ContainerRequest => write!(f, "container_request"),
            Self::Link => write!(f, "link"),
            Self::Other(segment) => write!(f, "other({segment})"),
        }
    }
}

/// Normalized lineage identifier.
///
/// Content hashes are stored hint-stripped, so two spellings of the same
/// content always produce the same [`NodeId::key`]. Hash keys and UUID keys
/// never collide: a locator always contains `+`, a UUID never does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
    Hash(Locator),
    Uuid(ObjectUuid),
}

impl NodeId {
    /// Parse and normalize an identifier.
    ///
    /// A trailing `/path` after a content hash is ignored. Surrounding
    /// whitespace is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some((loc, _)) = Locator::parse_with_path(s) {
            return Some(Self::Hash(loc.strip_hints()));
        }
        ObjectUuid::parse(s).map(Self::Uuid)
    }

    /// The visited-set / output-map key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn as_hash(&self) -> Option<&Locator> {
        match self {
            Self::Hash(loc) => Some(loc),
            Self::Uuid(_) => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&ObjectUuid> {
        match self {
            Self::Uuid(uuid) => Some(uuid),
            Self::Hash(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(loc) => write!(f, "{loc}"),
            Self::Uuid(uuid) => write!(f, "{uuid}"),
        }
    }
}

impl FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::UnknownIdentifier(s.to_string()))
    }
}

impl From<Locator> for NodeId {
    fn from(loc: Locator) -> Self {
        Self::Hash(loc.strip_hints())
    }
}

impl From<ObjectUuid> for NodeId {
    fn from(uuid: ObjectUuid) -> Self {
        Self::Uuid(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uuid_segments() {
        let uuid = ObjectUuid::parse("zzzzz-4zz18-znfnqtbbv4spc3w").unwrap();
        assert_eq!(uuid.cluster(), "zzzzz");
        assert_eq!(uuid.type_segment(), "4zz18");
        assert_eq!(uuid.kind(), ResourceKind::Collection);
    }

    #[test]
    fn rejects_malformed_uuids() {
        for s in [
            "",
            "zzzzz-4zz18",
            "zzzzz-4zz18-znfnqtbbv4spc3",
            "zzzzz-4zz18-znfnqtbbv4spc3wx",
            "ZZZZZ-4zz18-znfnqtbbv4spc3w",
            "zzzzz-4zz18-znfnqtbbv4spc3w-extra",
            "zzzzz_4zz18_znfnqtbbv4spc3w",
        ] {
            assert!(ObjectUuid::parse(s).is_none(), "{s:?} should not parse");
        }
    }

    #[test]
    fn resource_kinds_roundtrip_segments() {
        for kind in [
            ResourceKind::Job,
            ResourceKind::Collection,
            ResourceKind::Container,
            ResourceKind::ContainerRequest,
            ResourceKind::Link,
            ResourceKind::Other("tpzed".into()),
        ] {
            assert_eq!(ResourceKind::from_type_segment(kind.type_segment()), kind);
        }
    }

    #[test]
    fn node_id_strips_hints_and_paths() {
        let a = NodeId::parse("acbd18db4cc2f85cedef654fccc4a4d8+3+K@zzzzz").unwrap();
        let b = NodeId::parse("acbd18db4cc2f85cedef654fccc4a4d8+3/foo").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), "acbd18db4cc2f85cedef654fccc4a4d8+3");
    }

    #[test]
    fn node_id_distinguishes_kinds() {
        let hash = NodeId::parse("acbd18db4cc2f85cedef654fccc4a4d8+3").unwrap();
        assert!(hash.as_hash().is_some());
        let uuid = NodeId::parse(" zzzzz-8i9sb-cjs4pklxxjykqqq ").unwrap();
        assert_eq!(uuid.as_uuid().map(ObjectUuid::kind), Some(ResourceKind::Job));
        assert!(NodeId::parse("not an id").is_none());
    }
}
