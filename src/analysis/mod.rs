//! Dataset aggregation.
//!
//! This module holds the only logic with real semantics in the dashboard:
//! grouping, counting and averaging the loaded records.

pub mod aggregator;

pub use aggregator::*;
