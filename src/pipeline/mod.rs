//! Aggregation pipeline
//!
//! [`aggregator`] merges the output of all configured source units into one
//! playlist document; [`cache`] provides the optional content memoization
//! used when fresh-load-per-request is disabled.

pub mod aggregator;
pub mod cache;

pub use aggregator::{AggregationEngine, AggregationResult, PLAYLIST_HEADER};
pub use cache::ContentCache;
