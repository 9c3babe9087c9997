//! Benchmark support crate for topospine.
//!
//! Provides seeded synthetic fields and parameter types used by the
//! Criterion benchmarks for neighbourhood construction, classification and
//! full pipeline runs.

pub mod error;
pub mod params;
pub mod source;
