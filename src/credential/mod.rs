//! License credential loading.

pub mod reader;
