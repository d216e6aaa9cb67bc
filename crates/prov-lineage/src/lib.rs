//! Lineage graph walker.
//!
//! Answers "how was this produced" (upstream) and "what consumed this"
//! (downstream) for a collection, identified by content hash or UUID. The
//! graph itself lives in an external store reached through
//! [`LineageSource`]; the [`Walker`] drains an explicit worklist against it
//! and returns a flat [`LineageGraph`] keyed by normalized identifier.
//!
//! # Traversal rules
//!
//! - A content hash resolves to every collection sharing it. Several matches
//!   collapse into one [`LineageNode::Ambiguous`] node.
//! - Upstream, a hash leads to the jobs and containers that produced it, and
//!   a job or container leads to every hash and UUID mentioned in its inputs.
//! - Downstream, a hash leads to the jobs and containers that mention it, and
//!   a job or container leads to its output.
//! - Provenance links are followed in both directions and recorded as nodes.
//! - A denied lookup drops that branch only.

pub mod config;
pub mod error;
pub mod graph;
pub mod memory;
pub mod node;
pub mod scan;
pub mod source;
pub mod walker;

pub use config::WalkerConfig;
pub use error::{LineageError, LineageResult, LookupError, LookupResult};
pub use graph::LineageGraph;
pub use memory::InMemoryCatalog;
pub use node::{
    CollectionRecord, ContainerRecord, ContainerRequestRecord, JobRecord, LineageNode, LinkRecord,
};
pub use source::LineageSource;
pub use walker::{Direction, WalkTrace, Walker};
