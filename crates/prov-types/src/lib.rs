//! Foundation types for collection provenance.
//!
//! Every other `prov-*` crate depends on `prov-types`. It answers one question
//! for the rest of the system: given an identifier string, is it a content
//! address or an object UUID, and what is its canonical form?
//!
//! # Key Types
//!
//! - [`Locator`]: content address (`hash+size[+hint]*`), hint-insensitive equality
//! - [`ObjectUuid`]: opaque object identifier with an embedded resource type
//! - [`ResourceKind`]: closed set of resource kinds derived from a UUID
//! - [`NodeId`]: normalized lineage identifier (hint-stripped hash or UUID)

pub mod error;
pub mod identity;
pub mod locator;
pub mod scan;

pub use error::TypeError;
pub use identity::{NodeId, ObjectUuid, ResourceKind};
pub use locator::{Locator, EMPTY_BLOCK_LOCATOR};
pub use scan::{find_collection_uuid, find_hash_reference, find_reference};
