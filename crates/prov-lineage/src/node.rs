//! Lineage node types.
//!
//! The records mirror what the external object store hands back for each
//! resource kind, trimmed to the attributes traversal and rendering need.
//! [`LineageNode`] is the closed union a renderer matches on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prov_types::{Locator, ObjectUuid};

/// A stored collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub uuid: ObjectUuid,
    pub portable_data_hash: Locator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A batch job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub uuid: ObjectUuid,
    /// Arbitrarily nested job inputs.
    #[serde(default)]
    pub script_parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image_locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Locator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Locator>,
}

/// A container execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub uuid: ObjectUuid,
    #[serde(default)]
    pub mounts: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_image: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Locator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Locator>,
}

/// A request for a container; its output is a collection UUID rather than
/// a hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerRequestRecord {
    pub uuid: ObjectUuid,
    #[serde(default)]
    pub mounts: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_uuid: Option<ObjectUuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_uuid: Option<ObjectUuid>,
}

/// Link class marking an edge as provenance.
pub const PROVENANCE_LINK_CLASS: &str = "provenance";

/// An explicit directed edge from `tail_uuid` to `head_uuid`.
///
/// Both ends may be UUIDs or content hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub uuid: ObjectUuid,
    pub link_class: String,
    pub tail_uuid: String,
    pub head_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LinkRecord {
    pub fn is_provenance(&self) -> bool {
        self.link_class == PROVENANCE_LINK_CLASS
    }
}

/// One entry of a [`LineageGraph`](crate::LineageGraph).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineageNode {
    Collection(CollectionRecord),
    /// Several collections share one content hash.
    Ambiguous { hash: Locator, label: String },
    Job(JobRecord),
    Container(ContainerRecord),
    ContainerRequest(ContainerRequestRecord),
    Link(LinkRecord),
    /// A UUID of a kind the walker does not expand.
    Object {
        uuid: ObjectUuid,
        #[serde(default)]
        attributes: Value,
    },
}

impl LineageNode {
    /// Build the node for a content hash from every collection sharing it.
    ///
    /// Returns `None` when there are no matches.
    pub fn for_hash(hash: &Locator, mut matches: Vec<CollectionRecord>) -> Option<Self> {
        match matches.len() {
            0 => None,
            1 => matches.pop().map(Self::Collection),
            count => {
                let label = matches
                    .iter()
                    .filter_map(|c| c.name.as_deref())
                    .find(|name| !name.is_empty())
                    .map_or_else(
                        || hash.strip_hints().to_string(),
                        |name| format!("{name} + {} more", count - 1),
                    );
                Some(Self::Ambiguous {
                    hash: hash.strip_hints(),
                    label,
                })
            }
        }
    }

    /// Short kind name, as used in the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collection(_) => "collection",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Job(_) => "job",
            Self::Container(_) => "container",
            Self::ContainerRequest(_) => "container_request",
            Self::Link(_) => "link",
            Self::Object { .. } => "object",
        }
    }

    /// A one-line human-readable description.
    pub fn label(&self) -> String {
        match self {
            Self::Collection(c) => c.name.clone().unwrap_or_else(|| c.uuid.to_string()),
            Self::Ambiguous { label, .. } => label.clone(),
            Self::Job(j) => j.uuid.to_string(),
            Self::Container(c) => c.uuid.to_string(),
            Self::ContainerRequest(r) => r.uuid.to_string(),
            Self::Link(l) => format!("{} -> {}", l.tail_uuid, l.head_uuid),
            Self::Object { uuid, .. } => uuid.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOO: &str = "acbd18db4cc2f85cedef654fccc4a4d8+3";

    fn collection(uuid: &str, name: Option<&str>) -> CollectionRecord {
        CollectionRecord {
            uuid: ObjectUuid::parse(uuid).unwrap(),
            portable_data_hash: Locator::parse(FOO).unwrap(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn single_match_is_the_collection() {
        let hash = Locator::parse(FOO).unwrap();
        let c = collection("zzzzz-4zz18-aaaaaaaaaaaaaaa", Some("reads"));
        assert_eq!(
            LineageNode::for_hash(&hash, vec![c.clone()]),
            Some(LineageNode::Collection(c))
        );
        assert_eq!(LineageNode::for_hash(&hash, Vec::new()), None);
    }

    #[test]
    fn ambiguous_label_uses_first_named_match() {
        let hash = Locator::parse(&format!("{FOO}+K@zzzzz")).unwrap();
        let node = LineageNode::for_hash(
            &hash,
            vec![
                collection("zzzzz-4zz18-aaaaaaaaaaaaaaa", None),
                collection("zzzzz-4zz18-bbbbbbbbbbbbbbb", Some("reads")),
                collection("zzzzz-4zz18-ccccccccccccccc", Some("other")),
            ],
        )
        .unwrap();
        assert_eq!(node.label(), "reads + 2 more");
        assert!(matches!(node, LineageNode::Ambiguous { ref hash, .. } if !hash.has_hints()));
    }

    #[test]
    fn ambiguous_label_falls_back_to_hash() {
        let hash = Locator::parse(FOO).unwrap();
        let node = LineageNode::for_hash(
            &hash,
            vec![
                collection("zzzzz-4zz18-aaaaaaaaaaaaaaa", Some("")),
                collection("zzzzz-4zz18-bbbbbbbbbbbbbbb", None),
            ],
        )
        .unwrap();
        assert_eq!(node.label(), FOO);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let node = LineageNode::Ambiguous {
            hash: Locator::parse(FOO).unwrap(),
            label: FOO.to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "ambiguous");
        assert_eq!(json["hash"], FOO);

        let job: LineageNode = serde_json::from_str(
            r#"{"kind": "job", "uuid": "zzzzz-8i9sb-aaaaaaaaaaaaaaa", "output": "acbd18db4cc2f85cedef654fccc4a4d8+3"}"#,
        )
        .unwrap();
        assert_eq!(job.kind(), "job");
        assert_eq!(serde_json::to_value(&job).unwrap()["kind"], "job");
    }
}
