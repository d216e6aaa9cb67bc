use std::collections::HashMap;

use prov_types::Locator;

use crate::path::normalize_path;

/// A contiguous range of a stream's concatenated locator space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub offset: u64,
    pub len: u64,
}

impl ByteRange {
    pub fn new(offset: u64, len: u64) -> Self {
        Self { offset, len }
    }

    /// One past the last byte, saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Sum of locator sizes, or `None` on overflow.
pub fn checked_total(locators: &[Locator]) -> Option<u64> {
    locators
        .iter()
        .try_fold(0u64, |acc, loc| acc.checked_add(loc.size()))
}

/// A file within a stream: a name and the ranges that make up its content,
/// in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    ranges: Vec<ByteRange>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, ranges: Vec<ByteRange>) -> Self {
        Self {
            name: name.into(),
            ranges,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    /// File length in bytes.
    pub fn size(&self) -> u64 {
        self.ranges.iter().fold(0u64, |acc, r| acc.saturating_add(r.len))
    }
}

/// One directory of a manifest.
///
/// File names are unique within a stream; [`Stream::add_file`] refuses a
/// duplicate rather than overwriting it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stream {
    path: String,
    locators: Vec<Locator>,
    files: Vec<FileEntry>,
    /// File name -> index into `files`.
    by_name: HashMap<String, usize>,
}

impl Stream {
    /// Create an empty stream at `path` (normalized).
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            locators: Vec::new(),
            files: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.by_name.get(name).map(|&i| &self.files[i])
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns `true` if the stream holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of the concatenated locator space, saturating at
    /// `u64::MAX`. Parsed manifests never reach the cap.
    pub fn size(&self) -> u64 {
        self.locators
            .iter()
            .fold(0u64, |acc, loc| acc.saturating_add(loc.size()))
    }

    /// Total size, or `None` if it does not fit in a `u64`.
    pub fn checked_size(&self) -> Option<u64> {
        checked_total(&self.locators)
    }

    /// Start offset of every locator in the concatenated space.
    pub fn block_offsets(&self) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(self.locators.len());
        let mut pos = 0u64;
        for loc in &self.locators {
            offsets.push(pos);
            pos = pos.saturating_add(loc.size());
        }
        offsets
    }

    /// Index of the locator holding byte `offset`, skipping zero-length
    /// blocks. `offsets` must come from [`Stream::block_offsets`].
    pub fn block_at(&self, offsets: &[u64], offset: u64) -> Option<usize> {
        if offset >= self.size() {
            return None;
        }
        offsets.partition_point(|&start| start <= offset).checked_sub(1)
    }

    /// Append locators to the end of the byte space and return the offset at
    /// which the first appended locator starts.
    pub fn append_locators(&mut self, locators: &[Locator]) -> u64 {
        let base = self.size();
        self.locators.extend_from_slice(locators);
        base
    }

    /// Add a file. Returns `false` and leaves the stream untouched if a file
    /// with the same name already exists.
    pub fn add_file(&mut self, entry: FileEntry) -> bool {
        if self.by_name.contains_key(&entry.name) {
            return false;
        }
        self.by_name.insert(entry.name.clone(), self.files.len());
        self.files.push(entry);
        true
    }

    /// Append a range to the named file, creating the file if needed.
    ///
    /// Repeated file tokens with the same name concatenate.
    pub(crate) fn extend_file(&mut self, name: &str, range: ByteRange) {
        match self.by_name.get(name) {
            Some(&i) => self.files[i].ranges.push(range),
            None => {
                self.add_file(FileEntry::new(name, vec![range]));
            }
        }
    }
}
