//! Content hashing for collection provenance.
//!
//! - [`block_locator`] -- locator of raw bytes (`md5+len`)
//! - [`portable_data_hash`] -- content hash of a serialized manifest
//! - [`verify_portable_data_hash`] -- check manifest text against an expected hash

pub mod hasher;

pub use hasher::{block_locator, portable_data_hash, verify_portable_data_hash};
