use std::fmt;

use prov_types::NodeId;

use crate::error::{MergeError, MergeResult};

/// One merge input: a collection, optionally narrowed to a file or subtree,
/// optionally redirected to a destination directory.
///
/// Without `dest` the selected files keep their source directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub collection_id: String,
    pub path: Option<String>,
    pub dest: Option<String>,
}

impl Selector {
    /// Select a whole collection.
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            path: None,
            dest: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Parse `id[/path]`. A blank path selects the whole collection.
    pub fn parse(s: &str) -> MergeResult<Self> {
        let s = s.trim();
        let (id, path) = match s.split_once('/') {
            Some((id, path)) => (id, Some(path)),
            None => (s, None),
        };
        let mut selector = Self::new(id);
        selector.path = path
            .filter(|p| !p.trim_matches('/').is_empty())
            .map(str::to_string);
        selector.validate()?;
        Ok(selector)
    }

    /// Check the collection identifier and return its normalized form.
    pub fn validate(&self) -> MergeResult<NodeId> {
        NodeId::parse(&self.collection_id)
            .ok_or_else(|| MergeError::InvalidSelector(self.collection_id.clone()))
    }

    /// The source path to copy, `.` for the whole collection.
    pub fn source_path(&self) -> &str {
        self.path.as_deref().unwrap_or(prov_manifest::ROOT)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.collection_id)?;
        if let Some(path) = &self.path {
            write!(f, "/{}", path.trim_start_matches('/'))?;
        }
        Ok(())
    }
}
