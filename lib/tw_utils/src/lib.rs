//! Cross-crates utilities for the `TaintWrap` project.
//!
//! This crate gathers the concurrent containers shared by the analysis
//! crates: a single-flight memoizing cache and a concurrent multimap.

pub mod cache;
pub mod multimap;

pub use cache::ComputingCache;
pub use multimap::ConcurrentMultiMap;
