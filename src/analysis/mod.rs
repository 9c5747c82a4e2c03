//! Analysis modules.
//!
//! Calendar bucketing, per-central metrics and the cross-central driver.

pub mod aggregator;
pub mod buckets;
pub mod metrics;

pub use aggregator::analyze_centrals;
