//! Diagnostic trace of a merge.

/// One file placed in the destination manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopiedFile {
    /// Full path in the source manifest.
    pub source: String,
    /// Full path in the destination manifest.
    pub dest: String,
    /// Whether the file was given a collision suffix.
    pub renamed: bool,
}

/// What a merge did, in copy order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub copied: Vec<CopiedFile>,
    /// Requested source paths that matched nothing.
    pub skipped: Vec<String>,
}

impl MergeReport {
    /// Copies that had to be renamed.
    pub fn renamed(&self) -> impl Iterator<Item = &CopiedFile> {
        self.copied.iter().filter(|c| c.renamed)
    }

    pub fn is_empty(&self) -> bool {
        self.copied.is_empty() && self.skipped.is_empty()
    }
}
