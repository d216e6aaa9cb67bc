//! Worklist-driven lineage traversal.
//!
//! [`Walker`] resolves one identifier at a time against a
//! [`LineageSource`], records the resulting node and pushes the identifiers
//! it leads to. A visited set of normalized keys is consulted before any
//! lookup, so each distinct node is looked up at most once and cycles
//! terminate.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use prov_types::{find_reference, Locator, NodeId, ObjectUuid, ResourceKind};

use crate::config::WalkerConfig;
use crate::error::{LineageError, LineageResult, LookupError, LookupResult};
use crate::graph::LineageGraph;
use crate::node::{LineageNode, LinkRecord};
use crate::scan::references;
use crate::source::LineageSource;

/// Which way to walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards the inputs that produced a node.
    Upstream,
    /// Towards the things that consumed a node.
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "upstream" => Ok(Self::Upstream),
            "down" | "downstream" => Ok(Self::Downstream),
            other => Err(format!("unknown direction: {other:?}")),
        }
    }
}

/// Result of [`Walker::walk_traced`].
#[derive(Clone, Debug, Default)]
pub struct WalkTrace {
    pub graph: LineageGraph,
    /// Identifiers whose lookup was denied, in visit order.
    pub denied: Vec<String>,
    /// Identifiers that resolved to nothing.
    pub unresolved: Vec<String>,
    /// The walk stopped at the node limit with work still pending.
    pub truncated: bool,
}

/// Per-walk mutable state.
struct Walk {
    trace: WalkTrace,
    visited: HashSet<String>,
    pending: Vec<NodeId>,
}

impl Walk {
    fn new(start: NodeId) -> Self {
        Self {
            trace: WalkTrace::default(),
            visited: HashSet::new(),
            pending: vec![start],
        }
    }

    fn push(&mut self, id: NodeId) {
        if !self.visited.contains(&id.key()) {
            self.pending.push(id);
        }
    }

    fn push_all(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.push(id);
        }
    }

    fn push_ref(&mut self, s: &str) {
        if let Some(id) = find_reference(s) {
            self.push(id);
        }
    }

    fn record(&mut self, key: String, node: LineageNode) {
        trace!(id = %key, kind = node.kind(), "recorded node");
        self.trace.graph.insert(key, node);
    }

    fn record_link(&mut self, link: LinkRecord) {
        self.record(link.uuid.to_string(), LineageNode::Link(link));
    }

    fn unresolved(&mut self, id: &NodeId) {
        debug!(id = %id, "identifier resolved to nothing");
        self.trace.unresolved.push(id.key());
    }
}

/// Walks lineage over a [`LineageSource`].
///
/// A walker holds no per-walk state; each call to [`Walker::walk`] starts
/// from scratch, so one walker can serve many requests.
pub struct Walker<'a, S: LineageSource + ?Sized> {
    source: &'a S,
    config: WalkerConfig,
}

impl<'a, S: LineageSource + ?Sized> Walker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, WalkerConfig::default())
    }

    pub fn with_config(source: &'a S, config: WalkerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Walk from `start` and return the node map.
    pub fn walk(&self, start: &str, direction: Direction) -> LineageResult<LineageGraph> {
        self.walk_traced(start, direction).map(|trace| trace.graph)
    }

    /// Walk from `start`, also reporting denied and unresolved identifiers.
    ///
    /// Denied lookups drop their branch; an unavailable source aborts the
    /// walk.
    pub fn walk_traced(&self, start: &str, direction: Direction) -> LineageResult<WalkTrace> {
        let start_id =
            NodeId::parse(start).ok_or_else(|| LineageError::InvalidStart(start.to_string()))?;
        let mut walk = Walk::new(start_id);

        while let Some(id) = walk.pending.pop() {
            let key = id.key();
            if !walk.visited.insert(key.clone()) {
                continue;
            }
            if self
                .config
                .max_nodes
                .is_some_and(|max| walk.trace.graph.len() >= max)
            {
                warn!(limit = ?self.config.max_nodes, "node limit reached, lineage truncated");
                walk.trace.truncated = true;
                break;
            }

            match self.expand(&id, direction, &mut walk) {
                Ok(()) => {}
                Err(LookupError::Denied(reason)) => {
                    debug!(id = %key, %reason, "lookup denied, skipping branch");
                    walk.trace.denied.push(key);
                }
                Err(err) => return Err(err.into()),
            }
        }

        debug!(
            start,
            %direction,
            nodes = walk.trace.graph.len(),
            visited = walk.visited.len(),
            "walk finished"
        );
        Ok(walk.trace)
    }

    fn expand(&self, id: &NodeId, direction: Direction, walk: &mut Walk) -> LookupResult<()> {
        let follow = match id {
            NodeId::Hash(hash) => self.expand_hash(hash, direction, walk)?,
            NodeId::Uuid(uuid) => self.expand_uuid(uuid, direction, walk)?,
        };
        if follow {
            self.follow_links(id, direction, walk)?;
        }
        Ok(())
    }

    /// Returns whether the walk continues past this node.
    fn expand_hash(&self, hash: &Locator, direction: Direction, walk: &mut Walk) -> LookupResult<bool> {
        let matches = self.source.collections_by_hash(hash)?;
        let Some(node) = LineageNode::for_hash(hash, matches) else {
            walk.unresolved(&NodeId::Hash(hash.clone()));
            return Ok(false);
        };
        walk.record(hash.strip_hints().to_string(), node);

        match direction {
            Direction::Upstream => self.push_producers(hash, walk)?,
            Direction::Downstream => {
                if self.config.skip_empty_downstream && hash.is_empty_block() {
                    debug!("not following the empty block downstream");
                    return Ok(false);
                }
                for job in self.source.jobs_consuming(hash)? {
                    walk.push(NodeId::Uuid(job.uuid));
                }
                for container in self.source.containers_consuming(hash)? {
                    walk.push(NodeId::Uuid(container.uuid));
                }
            }
        }
        Ok(true)
    }

    fn push_producers(&self, hash: &Locator, walk: &mut Walk) -> LookupResult<()> {
        for job in self.source.jobs_producing(hash)? {
            walk.push(NodeId::Uuid(job.uuid));
        }
        for container in self.source.containers_producing(hash)? {
            walk.push(NodeId::Uuid(container.uuid));
        }
        Ok(())
    }

    fn expand_uuid(&self, uuid: &ObjectUuid, direction: Direction, walk: &mut Walk) -> LookupResult<bool> {
        let reserved = &self.config.reserved_fields;
        let key = uuid.to_string();
        let missing = || NodeId::Uuid(uuid.clone());

        match uuid.kind() {
            ResourceKind::Collection => {
                let Some(collection) = self.source.collection(uuid)? else {
                    walk.unresolved(&missing());
                    return Ok(false);
                };
                let hash = collection.portable_data_hash.strip_hints();
                walk.record(key, LineageNode::Collection(collection));
                match direction {
                    Direction::Upstream => {
                        self.push_producers(&hash, walk)?;
                        for request in self.source.requests_producing(uuid)? {
                            walk.push(NodeId::Uuid(request.uuid));
                        }
                    }
                    Direction::Downstream => walk.push(NodeId::Hash(hash)),
                }
            }
            ResourceKind::Job => {
                let Some(job) = self.source.job(uuid)? else {
                    walk.unresolved(&missing());
                    return Ok(false);
                };
                match direction {
                    Direction::Upstream => {
                        walk.push_all(references(&job.script_parameters, reserved));
                        if let Some(image) = &job.docker_image_locator {
                            walk.push_ref(image);
                        }
                    }
                    Direction::Downstream => {
                        if let Some(output) = &job.output {
                            walk.push(NodeId::from(output.clone()));
                        }
                    }
                }
                walk.record(key, LineageNode::Job(job));
            }
            ResourceKind::Container => {
                let Some(container) = self.source.container(uuid)? else {
                    walk.unresolved(&missing());
                    return Ok(false);
                };
                match direction {
                    Direction::Upstream => {
                        walk.push_all(references(&container.mounts, reserved));
                        if let Some(image) = &container.container_image {
                            walk.push_ref(image);
                        }
                        for arg in &container.command {
                            walk.push_ref(arg);
                        }
                    }
                    Direction::Downstream => {
                        if let Some(output) = &container.output {
                            walk.push(NodeId::from(output.clone()));
                        }
                    }
                }
                walk.record(key, LineageNode::Container(container));
            }
            ResourceKind::ContainerRequest => {
                let Some(request) = self.source.container_request(uuid)? else {
                    walk.unresolved(&missing());
                    return Ok(false);
                };
                match direction {
                    Direction::Upstream => {
                        walk.push_all(references(&request.mounts, reserved));
                        if let Some(image) = &request.container_image {
                            walk.push_ref(image);
                        }
                    }
                    Direction::Downstream => {
                        if let Some(output) = &request.output_uuid {
                            walk.push(NodeId::Uuid(output.clone()));
                        }
                    }
                }
                walk.record(key, LineageNode::ContainerRequest(request));
            }
            ResourceKind::Link => {
                let Some(link) = self.source.link(uuid)? else {
                    walk.unresolved(&missing());
                    return Ok(false);
                };
                // Tag and permission links are recorded but are not edges.
                if !link.is_provenance() {
                    debug!(id = %key, class = %link.link_class, "not following non-provenance link");
                    walk.record_link(link);
                    return Ok(false);
                }
                let next = match direction {
                    Direction::Upstream => &link.tail_uuid,
                    Direction::Downstream => &link.head_uuid,
                };
                if let Some(id) = NodeId::parse(next) {
                    walk.push(id);
                }
                walk.record_link(link);
            }
            ResourceKind::Other(_) => {
                let attributes = self.source.object(uuid)?.unwrap_or(Value::Null);
                walk.record(
                    key,
                    LineageNode::Object {
                        uuid: uuid.clone(),
                        attributes,
                    },
                );
            }
        }
        Ok(true)
    }

    /// Follow provenance links: upstream from head to tail, downstream from
    /// tail to head. Each link is recorded under its own UUID.
    fn follow_links(&self, id: &NodeId, direction: Direction, walk: &mut Walk) -> LookupResult<()> {
        let links = match direction {
            Direction::Upstream => self.source.links_to(id)?,
            Direction::Downstream => self.source.links_from(id)?,
        };
        for link in links {
            let next = match direction {
                Direction::Upstream => NodeId::parse(&link.tail_uuid),
                Direction::Downstream => NodeId::parse(&link.head_uuid),
            };
            if let Some(next) = next {
                walk.push(next);
            }
            walk.record_link(link);
        }
        Ok(())
    }
}
