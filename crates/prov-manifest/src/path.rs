//! Stream path helpers.
//!
//! Stream paths are `.` for the collection root and `./a/b` below it. Every
//! path that enters the model goes through [`normalize_path`] first.

/// Path of the root stream.
pub const ROOT: &str = ".";

/// Normalize a user- or manifest-supplied directory path.
///
/// Empty components and `.` components are dropped: `""`, `"/"`, `"./"` map
/// to `.`; `"a//b/"` and `"./a/b"` map to `./a/b`.
pub fn normalize_path(path: &str) -> String {
    let components: Vec<&str> = path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if components.is_empty() {
        ROOT.to_string()
    } else {
        format!("./{}", components.join("/"))
    }
}

/// Join a normalized directory and a relative path.
pub fn join_path(dir: &str, rel: &str) -> String {
    normalize_path(&format!("{dir}/{rel}"))
}

/// Split a file path into `(stream_path, file_name)`.
///
/// Returns `None` for the root itself, which names no file.
pub fn split_file_path(path: &str) -> Option<(String, String)> {
    let normalized = normalize_path(path);
    let (dir, name) = normalized.rsplit_once('/')?;
    let dir = if dir.is_empty() { ROOT } else { dir };
    Some((dir.to_string(), name.to_string()))
}

/// The part of `path` below `prefix`, if `path` is `prefix` or inside it.
///
/// Both arguments must already be normalized. The result is `""` when the
/// two are equal.
pub fn relative_to<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == ROOT {
        return Some(path.strip_prefix("./").unwrap_or(""));
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_root_spellings() {
        for p in ["", ".", "./", "/", "//", "./."] {
            assert_eq!(normalize_path(p), ".", "input {p:?}");
        }
    }

    #[test]
    fn normalizes_nested_paths() {
        assert_eq!(normalize_path("dir1"), "./dir1");
        assert_eq!(normalize_path("./dir1/"), "./dir1");
        assert_eq!(normalize_path("dir1//subdir"), "./dir1/subdir");
        assert_eq!(normalize_path("/dir1/./subdir"), "./dir1/subdir");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join_path(".", "foo"), "./foo");
        assert_eq!(join_path("./dir1", "sub/foo"), "./dir1/sub/foo");
        assert_eq!(join_path("./dir1", ""), "./dir1");
    }

    #[test]
    fn split_file_paths() {
        assert_eq!(
            split_file_path("foo"),
            Some((".".to_string(), "foo".to_string()))
        );
        assert_eq!(
            split_file_path("./dir1/subdir/foo"),
            Some(("./dir1/subdir".to_string(), "foo".to_string()))
        );
        assert_eq!(split_file_path("."), None);
    }

    #[test]
    fn relative_paths() {
        assert_eq!(relative_to("./dir1/sub", "./dir1"), Some("sub"));
        assert_eq!(relative_to("./dir1", "./dir1"), Some(""));
        assert_eq!(relative_to("./dir10", "./dir1"), None);
        assert_eq!(relative_to("./dir1", "."), Some("dir1"));
        assert_eq!(relative_to(".", "."), Some(""));
    }
}
