//! Benchmark resource endpoints.

pub mod benchmarks;
