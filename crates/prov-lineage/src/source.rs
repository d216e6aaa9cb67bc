use prov_types::{Locator, NodeId, ObjectUuid};
use serde_json::Value;

use crate::error::LookupResult;
use crate::node::{
    CollectionRecord, ContainerRecord, ContainerRequestRecord, JobRecord, LinkRecord,
};

/// The external object store, as seen by the lineage walker.
///
/// All implementations must satisfy these invariants:
/// - Lookups are already scoped to what the caller may read. An object the
///   caller may not read is reported as [`LookupError::Denied`], never as a
///   silent omission from a direct lookup.
/// - Content hashes arrive hint-stripped; comparisons must ignore hints.
/// - Every call returns a finite, fully materialized result.
///
/// [`LookupError::Denied`]: crate::LookupError::Denied
pub trait LineageSource {
    /// All collections whose portable data hash equals `hash`.
    fn collections_by_hash(&self, hash: &Locator) -> LookupResult<Vec<CollectionRecord>>;

    /// Returns `Ok(None)` if the object does not exist.
    fn collection(&self, uuid: &ObjectUuid) -> LookupResult<Option<CollectionRecord>>;

    fn job(&self, uuid: &ObjectUuid) -> LookupResult<Option<JobRecord>>;

    fn container(&self, uuid: &ObjectUuid) -> LookupResult<Option<ContainerRecord>>;

    fn container_request(&self, uuid: &ObjectUuid) -> LookupResult<Option<ContainerRequestRecord>>;

    fn link(&self, uuid: &ObjectUuid) -> LookupResult<Option<LinkRecord>>;

    /// Attributes of an object of a kind the walker does not expand.
    fn object(&self, uuid: &ObjectUuid) -> LookupResult<Option<Value>>;

    /// Jobs whose output or log is `hash`.
    fn jobs_producing(&self, hash: &Locator) -> LookupResult<Vec<JobRecord>>;

    /// Jobs whose parameters mention `hash`, or whose image resolves to it.
    fn jobs_consuming(&self, hash: &Locator) -> LookupResult<Vec<JobRecord>>;

    /// Containers whose output or log is `hash`.
    fn containers_producing(&self, hash: &Locator) -> LookupResult<Vec<ContainerRecord>>;

    /// Containers that mention `hash` in their mounts, image or command,
    /// excluding those that produced it.
    fn containers_consuming(&self, hash: &Locator) -> LookupResult<Vec<ContainerRecord>>;

    /// Container requests whose output or log collection is `uuid`.
    fn requests_producing(&self, uuid: &ObjectUuid) -> LookupResult<Vec<ContainerRequestRecord>>;

    /// Provenance links whose head is `id`.
    fn links_to(&self, id: &NodeId) -> LookupResult<Vec<LinkRecord>>;

    /// Provenance links whose tail is `id`.
    fn links_from(&self, id: &NodeId) -> LookupResult<Vec<LinkRecord>>;
}
