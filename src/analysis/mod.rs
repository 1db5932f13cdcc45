//! Aggregation of solver results.

pub mod aggregator;

pub use aggregator::*;
