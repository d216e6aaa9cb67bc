//! The merge engine proper.

use std::collections::HashMap;

use prov_manifest::path::relative_to;
use prov_manifest::{join_path, normalize_path, ByteRange, FileEntry, Manifest, Stream};
use tracing::{debug, trace};

use crate::naming::unique_name;
use crate::report::{CopiedFile, MergeReport};

/// Builds a destination manifest from pieces of source manifests.
///
/// One builder serves one merge request. Copies are applied in call order,
/// which is what makes collision suffixes reproducible.
#[derive(Debug, Default)]
pub struct MergeBuilder {
    manifest: Manifest,
    /// (destination stream, locator window text) -> offset of that window in
    /// the destination stream.
    windows: HashMap<(String, Vec<String>), u64>,
    report: MergeReport,
}

impl MergeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `path` is a file or directory in the destination.
    pub fn exists(&self, path: &str) -> bool {
        self.manifest.has_file(path) || self.manifest.has_dir(path)
    }

    /// Copy a file or subtree of `source` into the destination.
    ///
    /// `source_path` naming a file copies that file into `dest_dir`, or into
    /// the file's own source directory when `dest_dir` is `None`. Naming a
    /// directory (`.` for the root) copies every file below it, each stream
    /// landing at the same relative position under `dest_dir`, or at its
    /// original path when `dest_dir` is `None`.
    ///
    /// A path that matches nothing is skipped and recorded in the report.
    /// Returns the number of files copied.
    pub fn copy_path(&mut self, source_path: &str, dest_dir: Option<&str>, source: &Manifest) -> usize {
        let source_path = normalize_path(source_path);

        if let Some((stream, file)) = source.file(&source_path) {
            let dest = dest_dir.map_or_else(|| stream.path().to_string(), normalize_path);
            self.copy_file(stream, file, &dest);
            return 1;
        }

        if !source.has_dir(&source_path) {
            debug!(path = %source_path, "source path not found, skipping");
            self.report.skipped.push(source_path);
            return 0;
        }

        let mut copied = 0;
        for stream in source.streams_under(&source_path) {
            let dest = match dest_dir {
                Some(dir) => {
                    let rel = relative_to(stream.path(), &source_path).unwrap_or_default();
                    join_path(dir, rel)
                }
                None => stream.path().to_string(),
            };
            for file in stream.files() {
                self.copy_file(stream, file, &dest);
                copied += 1;
            }
        }
        debug!(path = %source_path, files = copied, "copied subtree");
        copied
    }

    fn copy_file(&mut self, stream: &Stream, file: &FileEntry, dest: &str) {
        let ranges = self.translate_ranges(stream, file, dest);

        let target = self.manifest.stream_entry(dest);
        let name = unique_name(file.name(), |n| target.has_file(n));
        let renamed = name != file.name();
        target.add_file(FileEntry::new(name.clone(), ranges));

        let copy = CopiedFile {
            source: join_path(stream.path(), file.name()),
            dest: join_path(dest, &name),
            renamed,
        };
        trace!(source = %copy.source, dest = %copy.dest, renamed, "copied file");
        self.report.copied.push(copy);
    }

    /// Append the locators `file` touches to the destination stream (reusing
    /// an identical window already there) and rebase its ranges onto it.
    fn translate_ranges(&mut self, stream: &Stream, file: &FileEntry, dest: &str) -> Vec<ByteRange> {
        let ranges: Vec<ByteRange> = file
            .ranges()
            .iter()
            .copied()
            .filter(|r| !r.is_empty())
            .collect();
        let (Some(start), Some(end)) = (
            ranges.iter().map(|r| r.offset).min(),
            ranges.iter().map(ByteRange::end).max(),
        ) else {
            return vec![ByteRange::new(0, 0)];
        };

        let offsets = stream.block_offsets();
        let window = match (stream.block_at(&offsets, start), stream.block_at(&offsets, end - 1)) {
            (Some(lo), Some(hi)) => lo..hi + 1,
            // Ranges outside the locator space cannot come from a parsed
            // manifest; keep the whole stream rather than lose bytes.
            _ => 0..stream.locators().len(),
        };
        let window_start = offsets.get(window.start).copied().unwrap_or(0);
        let locators = &stream.locators()[window];

        let key = (
            dest.to_string(),
            locators.iter().map(ToString::to_string).collect::<Vec<_>>(),
        );
        let base = match self.windows.get(&key) {
            Some(&base) => base,
            None => {
                let base = self.manifest.stream_entry(dest).append_locators(locators);
                self.windows.insert(key, base);
                base
            }
        };

        ranges
            .into_iter()
            .map(|r| ByteRange::new(r.offset - window_start + base, r.len))
            .collect()
    }

    /// The destination manifest built so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Canonical text of the destination manifest.
    pub fn manifest_text(&self) -> String {
        self.manifest.to_text()
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Finish the merge.
    pub fn finish(self) -> (Manifest, MergeReport) {
        (self.manifest, self.report)
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }
}
