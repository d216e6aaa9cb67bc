use std::collections::{BTreeMap, HashMap};

use prov_types::NodeId;

use crate::error::MergeResult;

/// Supplies source manifests to the merge engine.
///
/// Implementations are expected to have already applied any permission
/// checks. Lookups use the normalized identifier, so content hashes arrive
/// without hints.
pub trait CollectionSource {
    /// Return the manifest text of the collection, or `Ok(None)` if no such
    /// collection exists. Backend failures are reported as
    /// [`MergeError::Source`](crate::MergeError::Source).
    fn manifest_text(&self, id: &NodeId) -> MergeResult<Option<String>>;
}

impl CollectionSource for HashMap<String, String> {
    fn manifest_text(&self, id: &NodeId) -> MergeResult<Option<String>> {
        Ok(self.get(&id.key()).cloned())
    }
}

impl CollectionSource for BTreeMap<String, String> {
    fn manifest_text(&self, id: &NodeId) -> MergeResult<Option<String>> {
        Ok(self.get(&id.key()).cloned())
    }
}

impl<S: CollectionSource + ?Sized> CollectionSource for &S {
    fn manifest_text(&self, id: &NodeId) -> MergeResult<Option<String>> {
        (**self).manifest_text(id)
    }
}
