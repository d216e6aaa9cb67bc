//! Manifest text codec.

use std::collections::HashMap;
use std::fmt::Write;

use prov_types::{Locator, EMPTY_BLOCK_LOCATOR};
use tracing::trace;

use crate::error::{ManifestError, ManifestResult};
use crate::escape::{escape_name, unescape_name};
use crate::manifest::Manifest;
use crate::path::{join_path, normalize_path, split_file_path};
use crate::stream::{checked_total, ByteRange, Stream};

/// A parsed `position:length:name` token.
struct FileToken {
    offset: u64,
    len: u64,
    name: String,
}

/// Parse manifest text into a [`Manifest`].
///
/// Lines naming the same stream are merged: each line's locators are appended
/// to the stream and its file ranges shifted past what was already there.
/// A file name containing `/` places the file in the matching sub-stream.
pub fn parse(text: &str) -> ManifestResult<Manifest> {
    let mut manifest = Manifest::new();

    for (idx, line) in text.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let mut tokens = line.split(' ');

        let raw_path = tokens.next().unwrap_or_default();
        let path = unescape_name(raw_path)
            .filter(|p| p == "." || p.starts_with("./"))
            .ok_or_else(|| {
                ManifestError::malformed(line_no, format!("invalid stream name: {raw_path}"))
            })?;
        let stream_path = normalize_path(&path);

        let mut locators = Vec::new();
        let mut files = Vec::new();
        for token in tokens {
            if token.is_empty() {
                return Err(ManifestError::malformed(line_no, "empty token"));
            }
            if files.is_empty() {
                if let Some(loc) = Locator::parse(token) {
                    locators.push(loc);
                    continue;
                }
                if locators.is_empty() {
                    return Err(ManifestError::malformed(line_no, "no block locators found"));
                }
            }
            let file = parse_file_token(token).ok_or_else(|| {
                ManifestError::malformed(line_no, format!("invalid file token: {token}"))
            })?;
            files.push(file);
        }

        if locators.is_empty() {
            return Err(ManifestError::malformed(line_no, "no block locators found"));
        }
        if files.is_empty() {
            return Err(ManifestError::malformed(line_no, "no file tokens found"));
        }

        let line_size = checked_total(&locators)
            .ok_or_else(|| ManifestError::malformed(line_no, "stream size overflow"))?;
        // Target stream path -> offset where this line's locators start there.
        let mut bases: HashMap<String, u64> = HashMap::new();

        for file in files {
            let in_range = file
                .offset
                .checked_add(file.len)
                .is_some_and(|end| end <= line_size);
            if !in_range {
                return Err(ManifestError::malformed(
                    line_no,
                    format!(
                        "segment {}:{} of {:?} exceeds stream size {line_size}",
                        file.offset, file.len, file.name
                    ),
                ));
            }

            let (dir, name) = resolve_file_name(&stream_path, &file.name)
                .ok_or_else(|| {
                    ManifestError::malformed(line_no, format!("invalid file name: {:?}", file.name))
                })?;

            let base = match bases.get(&dir) {
                Some(&base) => base,
                None => {
                    // Byte offsets of the whole stream must stay addressable.
                    let fits = manifest
                        .stream(&dir)
                        .map_or(Some(0), Stream::checked_size)
                        .and_then(|size| size.checked_add(line_size))
                        .is_some();
                    if !fits {
                        return Err(ManifestError::malformed(line_no, "stream size overflow"));
                    }
                    let base = manifest.stream_entry(&dir).append_locators(&locators);
                    bases.insert(dir.clone(), base);
                    base
                }
            };
            manifest
                .stream_entry(&dir)
                .extend_file(&name, ByteRange::new(base + file.offset, file.len));
        }
        trace!(line = line_no, stream = %stream_path, "parsed stream line");
    }

    Ok(manifest)
}

fn parse_file_token(token: &str) -> Option<FileToken> {
    let mut fields = token.splitn(3, ':');
    let offset = parse_decimal(fields.next()?)?;
    let len = parse_decimal(fields.next()?)?;
    let name = fields.next().filter(|n| !n.is_empty())?;
    Some(FileToken {
        offset,
        len,
        name: unescape_name(name)?,
    })
}

fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Map a (possibly slash-containing) file token name to its stream and
/// base name. Rejects empty, `.` and `..` components.
fn resolve_file_name(stream_path: &str, name: &str) -> Option<(String, String)> {
    if name
        .split('/')
        .any(|c| c.is_empty() || c == "." || c == "..")
    {
        return None;
    }
    split_file_path(&join_path(stream_path, name))
}

/// Serialize a manifest to canonical text.
///
/// Streams without files are omitted. A stream with files but no locators
/// (only zero-length files) is written with the empty-block locator so the
/// line stays parseable.
pub fn write(manifest: &Manifest) -> String {
    let mut out = String::new();
    for stream in manifest.streams() {
        if stream.is_empty() {
            continue;
        }
        out.push_str(&escape_name(stream.path()));

        if stream.locators().is_empty() {
            out.push(' ');
            out.push_str(EMPTY_BLOCK_LOCATOR);
        }
        for loc in stream.locators() {
            let _ = write!(out, " {loc}");
        }

        for file in stream.files() {
            let name = escape_name(file.name());
            if file.ranges().is_empty() {
                let _ = write!(out, " 0:0:{name}");
            }
            for range in file.ranges() {
                let _ = write!(out, " {}:{}:{name}", range.offset, range.len);
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{FileEntry, Stream};

    const FOO: &str = "acbd18db4cc2f85cedef654fccc4a4d8+3";
    const BAR: &str = "37b51d194a7513e45b56f6524f2d51f2+3";

    fn err_reason(text: &str) -> String {
        match parse(text).unwrap_err() {
            ManifestError::Malformed { reason, .. } => reason,
        }
    }

    #[test]
    fn canonical_text_survives_parse_and_write() {
        let text = format!(
            ". {FOO} {BAR} 0:3:foo 3:3:bar 0:6:foo\\040bar\n./dir1 {FOO} 0:0:empty 0:3:foo\n"
        );
        let manifest = parse(&text).unwrap();
        assert_eq!(write(&manifest), text);
    }

    #[test]
    fn tolerates_duplicate_locators_and_zero_length_files() {
        let text = format!(". {FOO} {FOO} 0:3:foo 3:3:foo2 0:0:zero\n");
        let manifest = parse(&text).unwrap();
        let stream = manifest.stream(".").unwrap();
        assert_eq!(stream.locators().len(), 2);
        assert_eq!(stream.file("zero").unwrap().size(), 0);
        assert_eq!(stream.file("foo2").unwrap().ranges(), &[ByteRange::new(3, 3)]);
    }

    #[test]
    fn file_spanning_locators() {
        let manifest = parse(&format!(". {FOO} {BAR} 1:4:oob\n")).unwrap();
        let (_, file) = manifest.file("oob").unwrap();
        assert_eq!(file.ranges(), &[ByteRange::new(1, 4)]);
    }

    #[test]
    fn repeated_tokens_concatenate() {
        let manifest = parse(&format!(". {FOO} {BAR} 0:3:frob 3:3:frob\n")).unwrap();
        assert_eq!(manifest.file("frob").unwrap().1.size(), 6);
    }

    #[test]
    fn repeated_stream_lines_are_merged() {
        let text = format!(". {FOO} 0:3:foo\n. {BAR} 0:3:bar\n");
        let manifest = parse(&text).unwrap();
        assert_eq!(manifest.len(), 1);
        let stream = manifest.stream(".").unwrap();
        assert_eq!(stream.file("bar").unwrap().ranges(), &[ByteRange::new(3, 3)]);
        assert_eq!(write(&manifest), format!(". {FOO} {BAR} 0:3:foo 3:3:bar\n"));
    }

    #[test]
    fn slash_names_move_into_substreams() {
        let manifest = parse(&format!(". {FOO} 0:3:foo 0:3:sub/foo\n")).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.has_file("./sub/foo"));
        let sub = manifest.stream("./sub").unwrap();
        assert_eq!(sub.locators().len(), 1);
        assert_eq!(sub.file("foo").unwrap().ranges(), &[ByteRange::new(0, 3)]);
    }

    #[test]
    fn rejects_bad_stream_names() {
        assert_eq!(
            err_reason(&format!("badstream {FOO} 0:1:file1.txt")),
            "invalid stream name: badstream"
        );
        assert_eq!(
            err_reason(&format!("/badstream {FOO} 0:1:file1.txt")),
            "invalid stream name: /badstream"
        );
    }

    #[test]
    fn rejects_bad_file_tokens() {
        assert_eq!(
            err_reason(&format!(". {FOO} file1.txt")),
            "invalid file token: file1.txt"
        );
        assert_eq!(
            err_reason(&format!(". {FOO} 0:1:file1.txt file2.txt")),
            "invalid file token: file2.txt"
        );
        assert_eq!(err_reason(&format!(". {FOO} ::file2.txt")), "invalid file token: ::file2.txt");
        assert_eq!(err_reason(&format!(". {FOO} 0:1:")), "invalid file token: 0:1:");
        assert_eq!(
            err_reason(&format!(". {FOO} 0:1:a {BAR}")),
            format!("invalid file token: {BAR}")
        );
    }

    #[test]
    fn rejects_missing_locators_and_files() {
        assert_eq!(err_reason(". 0:1:file1.txt\n"), "no block locators found");
        assert_eq!(err_reason(".\n"), "no block locators found");
        assert_eq!(err_reason(&format!(". {FOO} {BAR}\n")), "no file tokens found");
        assert_eq!(err_reason(&format!(". {FOO} ")), "empty token");
    }

    #[test]
    fn rejects_out_of_range_segments_and_bad_names() {
        assert!(err_reason(&format!(". {FOO} 2:2:foo\n")).contains("exceeds stream size 3"));
        assert!(err_reason(&format!(". {FOO} 0:3:a/../foo\n")).starts_with("invalid file name"));
        assert!(err_reason(&format!(". {FOO} 0:3:a//foo\n")).starts_with("invalid file name"));
    }

    #[test]
    fn rejects_stream_size_overflow() {
        let huge = "acbd18db4cc2f85cedef654fccc4a4d8+18446744073709551615";
        assert_eq!(err_reason(&format!(". {huge} {huge} 0:1:a\n")), "stream size overflow");

        // Each line fits on its own; the merged stream does not.
        let text = format!(". {huge} 0:1:a\n. {huge} 0:1:b\n");
        assert!(matches!(
            parse(&text),
            Err(ManifestError::Malformed { line: 2, ref reason }) if reason == "stream size overflow"
        ));

        let manifest = parse(&format!(". {huge} 0:18446744073709551615:a\n")).unwrap();
        assert_eq!(manifest.total_size(), u64::MAX);
    }

    #[test]
    fn reports_line_number() {
        let text = format!(". {FOO} 0:3:foo\nbroken {FOO} 0:3:foo\n");
        assert!(matches!(
            parse(&text),
            Err(ManifestError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn empty_text_is_empty_manifest() {
        let manifest = parse("").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(write(&manifest), "");
    }

    #[test]
    fn locatorless_stream_gets_empty_block() {
        let mut manifest = Manifest::new();
        manifest
            .stream_entry("./dir1")
            .add_file(FileEntry::new("zero", Vec::new()));
        manifest.stream_entry("./unused");
        assert_eq!(
            write(&manifest),
            format!("./dir1 {EMPTY_BLOCK_LOCATOR} 0:0:zero\n")
        );
        let reparsed = parse(&write(&manifest)).unwrap();
        assert!(reparsed.has_file("dir1/zero"));
        assert!(Stream::new("./unused").is_empty());
    }

    #[test]
    fn escaped_stream_paths() {
        let text = format!("./foo\\040bar {FOO} 0:3:baz\n");
        let manifest = parse(&text).unwrap();
        assert!(manifest.has_file("./foo bar/baz"));
        assert_eq!(write(&manifest), text);
    }

    #[test]
    fn portable_data_hash_is_stable() {
        let text = format!(". {FOO} 0:3:foo\n");
        let manifest = parse(&text).unwrap();
        assert_eq!(
            prov_crypto::portable_data_hash(&write(&manifest)).to_string(),
            "1f4b0bc7583c2a7f9102c395f4ffc5e3+45"
        );
    }
}
