//! In-memory lineage catalog for testing and local use.
//!
//! [`InMemoryCatalog`] holds plain vectors of records and answers every
//! [`LineageSource`] query by scanning them. It deserializes from a JSON
//! document with one array per record kind, which is what the `prov lineage`
//! command reads.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prov_types::{find_reference, Locator, NodeId, ObjectUuid};

use crate::error::{LookupError, LookupResult};
use crate::node::{
    CollectionRecord, ContainerRecord, ContainerRequestRecord, JobRecord, LinkRecord,
};
use crate::scan::{mentions_hash, str_mentions};
use crate::source::LineageSource;

/// An in-memory implementation of [`LineageSource`].
///
/// Identifiers in `denied` (UUIDs or hint-free hashes) fail direct lookups
/// with [`LookupError::Denied`], which is how tests model permission
/// boundaries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryCatalog {
    pub collections: Vec<CollectionRecord>,
    pub jobs: Vec<JobRecord>,
    pub containers: Vec<ContainerRecord>,
    pub container_requests: Vec<ContainerRequestRecord>,
    pub links: Vec<LinkRecord>,
    /// Attributes of objects of other kinds, by UUID.
    pub objects: BTreeMap<String, Value>,
    pub denied: BTreeSet<String>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON form.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn with_collection(mut self, record: CollectionRecord) -> Self {
        self.collections.push(record);
        self
    }

    pub fn with_job(mut self, record: JobRecord) -> Self {
        self.jobs.push(record);
        self
    }

    pub fn with_container(mut self, record: ContainerRecord) -> Self {
        self.containers.push(record);
        self
    }

    pub fn with_container_request(mut self, record: ContainerRequestRecord) -> Self {
        self.container_requests.push(record);
        self
    }

    pub fn with_link(mut self, record: LinkRecord) -> Self {
        self.links.push(record);
        self
    }

    pub fn with_object(mut self, uuid: &ObjectUuid, attributes: Value) -> Self {
        self.objects.insert(uuid.to_string(), attributes);
        self
    }

    /// Make direct lookups of `id` fail with [`LookupError::Denied`].
    pub fn deny(mut self, id: impl Into<String>) -> Self {
        self.denied.insert(id.into());
        self
    }

    fn check(&self, key: &str) -> LookupResult<()> {
        if self.denied.contains(key) {
            return Err(LookupError::Denied(key.to_string()));
        }
        Ok(())
    }

    fn find<'a, T>(
        &self,
        records: &'a [T],
        uuid: &ObjectUuid,
        uuid_of: impl Fn(&T) -> &ObjectUuid,
    ) -> LookupResult<Option<&'a T>> {
        self.check(uuid.as_str())?;
        Ok(records.iter().find(|r| uuid_of(r) == uuid))
    }

    /// Returns `true` if an image reference names `hash`, directly or via a
    /// collection UUID.
    fn image_resolves_to(&self, image: &str, hash: &Locator) -> bool {
        match find_reference(image) {
            Some(NodeId::Hash(loc)) => loc == *hash,
            Some(NodeId::Uuid(uuid)) => self
                .collections
                .iter()
                .any(|c| c.uuid == uuid && c.portable_data_hash == *hash),
            None => false,
        }
    }

    fn provenance_links<'a>(
        &'a self,
        end: impl Fn(&LinkRecord) -> &str + 'a,
        id: &'a NodeId,
    ) -> impl Iterator<Item = &'a LinkRecord> + 'a {
        self.links
            .iter()
            .filter(|l| l.is_provenance())
            .filter(move |l| NodeId::parse(end(l)).as_ref() == Some(id))
    }
}

impl LineageSource for InMemoryCatalog {
    fn collections_by_hash(&self, hash: &Locator) -> LookupResult<Vec<CollectionRecord>> {
        self.check(&hash.strip_hints().to_string())?;
        Ok(self
            .collections
            .iter()
            .filter(|c| c.portable_data_hash == *hash)
            .filter(|c| !self.denied.contains(c.uuid.as_str()))
            .cloned()
            .collect())
    }

    fn collection(&self, uuid: &ObjectUuid) -> LookupResult<Option<CollectionRecord>> {
        Ok(self.find(&self.collections, uuid, |c| &c.uuid)?.cloned())
    }

    fn job(&self, uuid: &ObjectUuid) -> LookupResult<Option<JobRecord>> {
        Ok(self.find(&self.jobs, uuid, |j| &j.uuid)?.cloned())
    }

    fn container(&self, uuid: &ObjectUuid) -> LookupResult<Option<ContainerRecord>> {
        Ok(self.find(&self.containers, uuid, |c| &c.uuid)?.cloned())
    }

    fn container_request(&self, uuid: &ObjectUuid) -> LookupResult<Option<ContainerRequestRecord>> {
        Ok(self.find(&self.container_requests, uuid, |r| &r.uuid)?.cloned())
    }

    fn link(&self, uuid: &ObjectUuid) -> LookupResult<Option<LinkRecord>> {
        Ok(self.find(&self.links, uuid, |l| &l.uuid)?.cloned())
    }

    fn object(&self, uuid: &ObjectUuid) -> LookupResult<Option<Value>> {
        self.check(uuid.as_str())?;
        Ok(self.objects.get(uuid.as_str()).cloned())
    }

    fn jobs_producing(&self, hash: &Locator) -> LookupResult<Vec<JobRecord>> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.output.as_ref() == Some(hash) || j.log.as_ref() == Some(hash))
            .cloned()
            .collect())
    }

    fn jobs_consuming(&self, hash: &Locator) -> LookupResult<Vec<JobRecord>> {
        Ok(self
            .jobs
            .iter()
            .filter(|j| {
                mentions_hash(&j.script_parameters, hash)
                    || j.docker_image_locator
                        .as_deref()
                        .is_some_and(|image| self.image_resolves_to(image, hash))
            })
            .cloned()
            .collect())
    }

    fn containers_producing(&self, hash: &Locator) -> LookupResult<Vec<ContainerRecord>> {
        Ok(self
            .containers
            .iter()
            .filter(|c| c.output.as_ref() == Some(hash) || c.log.as_ref() == Some(hash))
            .cloned()
            .collect())
    }

    fn containers_consuming(&self, hash: &Locator) -> LookupResult<Vec<ContainerRecord>> {
        let needle = hash.strip_hints().to_string();
        Ok(self
            .containers
            .iter()
            .filter(|c| c.output.as_ref() != Some(hash) && c.log.as_ref() != Some(hash))
            .filter(|c| {
                mentions_hash(&c.mounts, hash)
                    || c.container_image
                        .as_deref()
                        .is_some_and(|image| self.image_resolves_to(image, hash))
                    || c.command.iter().any(|arg| str_mentions(arg, &needle))
            })
            .cloned()
            .collect())
    }

    fn requests_producing(&self, uuid: &ObjectUuid) -> LookupResult<Vec<ContainerRequestRecord>> {
        Ok(self
            .container_requests
            .iter()
            .filter(|r| r.output_uuid.as_ref() == Some(uuid) || r.log_uuid.as_ref() == Some(uuid))
            .cloned()
            .collect())
    }

    fn links_to(&self, id: &NodeId) -> LookupResult<Vec<LinkRecord>> {
        Ok(self
            .provenance_links(|l| l.head_uuid.as_str(), id)
            .cloned()
            .collect())
    }

    fn links_from(&self, id: &NodeId) -> LookupResult<Vec<LinkRecord>> {
        Ok(self
            .provenance_links(|l| l.tail_uuid.as_str(), id)
            .cloned()
            .collect())
    }
}
