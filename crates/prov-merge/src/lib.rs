//! Merge engine for collection manifests.
//!
//! Builds one new [`Manifest`](prov_manifest::Manifest) out of files and
//! subtrees selected from any number of source manifests. Nothing in a
//! source is ever overwritten: a file whose name is already taken in its
//! destination stream is renamed with the smallest free `(n)` suffix.
//!
//! [`MergeBuilder`] is the low-level engine; [`merge_selectors`] drives it
//! from a list of [`Selector`]s and a [`CollectionSource`].

pub mod builder;
pub mod error;
pub mod merge;
pub mod naming;
pub mod report;
pub mod selector;
pub mod source;

pub use builder::MergeBuilder;
pub use error::{MergeError, MergeResult};
pub use merge::{merge_selectors, MergedCollection};
pub use naming::{suffixed_name, unique_name};
pub use report::{CopiedFile, MergeReport};
pub use selector::Selector;
pub use source::CollectionSource;
