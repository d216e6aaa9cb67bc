use std::collections::HashMap;
use std::fmt;

use crate::error::ManifestResult;
use crate::path::{join_path, normalize_path, relative_to, split_file_path, ROOT};
use crate::stream::{FileEntry, Stream};
use crate::text;

/// A collection's file tree: streams in insertion order, at most one per
/// path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    streams: Vec<Stream>,
    /// Stream path -> index into `streams`.
    by_path: HashMap<String, usize>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> ManifestResult<Self> {
        text::parse(text)
    }

    /// Serialize to canonical manifest text.
    pub fn to_text(&self) -> String {
        text::write(self)
    }

    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    /// Number of streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Look up a stream by directory path (normalized first).
    pub fn stream(&self, path: &str) -> Option<&Stream> {
        self.by_path
            .get(&normalize_path(path))
            .map(|&i| &self.streams[i])
    }

    /// The stream at `path`, appended as a new empty stream if absent.
    pub fn stream_entry(&mut self, path: &str) -> &mut Stream {
        let path = normalize_path(path);
        let idx = match self.by_path.get(&path) {
            Some(&i) => i,
            None => {
                self.streams.push(Stream::new(&path));
                self.by_path.insert(path, self.streams.len() - 1);
                self.streams.len() - 1
            }
        };
        &mut self.streams[idx]
    }

    /// Full path of every file, stream by stream.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn file_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.streams.iter().flat_map(|stream| {
            stream
                .files()
                .iter()
                .map(move |file| join_path(stream.path(), file.name()))
        })
    }

    /// Find the file at a full path.
    pub fn file(&self, path: &str) -> Option<(&Stream, &FileEntry)> {
        let (dir, name) = split_file_path(path)?;
        let stream = self.stream(&dir)?;
        stream.file(&name).map(|file| (stream, file))
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    /// Returns `true` if `path` is the root or the directory of some stream
    /// (or an ancestor of one).
    pub fn has_dir(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.streams_under(&path).next().is_some() || path == ROOT
    }

    /// Streams at or below `prefix`, in manifest order.
    pub fn streams_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Stream> + 'a {
        self.streams
            .iter()
            .filter(move |stream| relative_to(stream.path(), prefix).is_some())
    }

    /// Total number of files across all streams.
    pub fn file_count(&self) -> usize {
        self.streams.iter().map(|s| s.files().len()).sum()
    }

    /// Sum of file sizes across all streams.
    pub fn total_size(&self) -> u64 {
        self.streams
            .iter()
            .flat_map(|s| s.files())
            .fold(0u64, |acc, file| acc.saturating_add(file.size()))
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTILEVEL: &str = "\
. acbd18db4cc2f85cedef654fccc4a4d8+3 0:3:foo
./dir1 37b51d194a7513e45b56f6524f2d51f2+3 0:3:bar 0:3:bar2
./dir1/subdir acbd18db4cc2f85cedef654fccc4a4d8+3 0:3:foo
";

    #[test]
    fn file_paths_are_lazy_and_restartable() {
        let m = Manifest::parse(MULTILEVEL).unwrap();
        let first: Vec<String> = m.file_paths().collect();
        assert_eq!(
            first,
            vec!["./foo", "./dir1/bar", "./dir1/bar2", "./dir1/subdir/foo"]
        );
        assert_eq!(m.file_paths().next().as_deref(), Some("./foo"));
    }

    #[test]
    fn has_file_accepts_any_spelling() {
        let m = Manifest::parse(MULTILEVEL).unwrap();
        assert!(m.has_file("foo"));
        assert!(m.has_file("./dir1/bar"));
        assert!(m.has_file("dir1/subdir/foo"));
        assert!(!m.has_file("dir1"));
        assert!(!m.has_file("dir1/foo"));
    }

    #[test]
    fn has_dir_checks_stream_prefixes() {
        let m = Manifest::parse(MULTILEVEL).unwrap();
        assert!(m.has_dir("."));
        assert!(m.has_dir("dir1"));
        assert!(m.has_dir("./dir1/subdir"));
        assert!(!m.has_dir("dir"));
        assert!(!m.has_dir("dir1/foo"));
    }

    #[test]
    fn streams_under_prefix() {
        let m = Manifest::parse(MULTILEVEL).unwrap();
        let paths: Vec<&str> = m.streams_under("./dir1").map(Stream::path).collect();
        assert_eq!(paths, vec!["./dir1", "./dir1/subdir"]);
        assert_eq!(m.streams_under(ROOT).count(), 3);
    }

    #[test]
    fn stream_entry_appends_in_order() {
        let mut m = Manifest::new();
        m.stream_entry("b");
        m.stream_entry("a");
        m.stream_entry("./b/");
        let paths: Vec<&str> = m.streams().map(Stream::path).collect();
        assert_eq!(paths, vec!["./b", "./a"]);
    }

    #[test]
    fn counts_and_sizes() {
        let m = Manifest::parse(MULTILEVEL).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.file_count(), 4);
        assert_eq!(m.total_size(), 12);
        assert!(Manifest::new().is_empty());
    }
}
