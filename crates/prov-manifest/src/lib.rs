//! Collection manifests.
//!
//! A manifest describes a collection's directory tree in terms of content
//! locators and byte ranges. Each [`Stream`] is one directory: an ordered list
//! of locators whose concatenation forms a virtual byte space, plus the
//! [`FileEntry`] values that reference ranges of that space.
//!
//! # Text Format
//!
//! One line per stream, newline-terminated:
//!
//! ```text
//! ./dir1 acbd18db4cc2f85cedef654fccc4a4d8+3 37b51d194a7513e45b56f6524f2d51f2+3 0:3:foo 3:3:bar
//! ```
//!
//! Whitespace in names is written as three-digit octal (`\040`), backslash as
//! `\\`. Serialization is deterministic: streams and files keep insertion
//! order, so the portable data hash of the text is stable for a given build
//! sequence.

pub mod error;
pub mod escape;
pub mod manifest;
pub mod path;
pub mod stream;
pub mod text;

pub use error::{ManifestError, ManifestResult};
pub use escape::{escape_name, unescape_name};
pub use manifest::Manifest;
pub use path::{join_path, normalize_path, split_file_path, ROOT};
pub use stream::{ByteRange, FileEntry, Stream};
