//! Analysis modules.
//!
//! Filtering and aggregation of the loaded dataset.

pub mod aggregator;

pub use aggregator::*;
