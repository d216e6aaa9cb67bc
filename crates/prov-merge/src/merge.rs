//! Selector-driven merges.

use std::collections::HashMap;

use prov_manifest::Manifest;
use prov_types::{Locator, NodeId};
use tracing::debug;

use crate::builder::MergeBuilder;
use crate::error::{MergeError, MergeResult};
use crate::report::MergeReport;
use crate::selector::Selector;
use crate::source::CollectionSource;

/// Result of [`merge_selectors`], ready to be persisted by the caller.
#[derive(Clone, Debug)]
pub struct MergedCollection {
    pub manifest: Manifest,
    pub manifest_text: String,
    pub portable_data_hash: Locator,
    pub report: MergeReport,
}

/// Merge the selected files of several collections into one manifest.
///
/// Every selector is validated before any source is fetched, so an
/// unparseable selector fails the request without partial work. Each
/// distinct collection is fetched and parsed once. Selectors are applied in
/// order, which fixes the outcome of name collisions.
pub fn merge_selectors<S>(selectors: &[Selector], source: &S) -> MergeResult<MergedCollection>
where
    S: CollectionSource + ?Sized,
{
    let ids = selectors
        .iter()
        .map(Selector::validate)
        .collect::<MergeResult<Vec<NodeId>>>()?;

    let mut cache: HashMap<String, Manifest> = HashMap::new();
    let mut builder = MergeBuilder::new();

    for (selector, id) in selectors.iter().zip(&ids) {
        let key = id.key();
        if !cache.contains_key(&key) {
            let manifest = load_manifest(source, id)?;
            cache.insert(key.clone(), manifest);
        }
        let Some(manifest) = cache.get(&key) else {
            continue;
        };
        let copied = builder.copy_path(selector.source_path(), selector.dest.as_deref(), manifest);
        debug!(selector = %selector, copied, "applied selector");
    }

    let (manifest, report) = builder.finish();
    let manifest_text = manifest.to_text();
    let portable_data_hash = prov_crypto::portable_data_hash(&manifest_text);
    Ok(MergedCollection {
        manifest,
        manifest_text,
        portable_data_hash,
        report,
    })
}

fn load_manifest<S>(source: &S, id: &NodeId) -> MergeResult<Manifest>
where
    S: CollectionSource + ?Sized,
{
    let text = source
        .manifest_text(id)?
        .ok_or_else(|| MergeError::CollectionNotFound(id.key()))?;
    Manifest::parse(&text).map_err(|source| MergeError::MalformedManifest {
        collection: id.key(),
        source,
    })
}
