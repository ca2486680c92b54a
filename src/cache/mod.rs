//! Token cache: record format and file store.

pub mod file;
pub mod format;
