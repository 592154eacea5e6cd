//! Run reporting
//!
//! Typed per-ad outcomes and their aggregation into keyword- and
//! run-level statistics.

mod stats;

pub use stats::{AdOutcome, KeywordStats, RunSummary};
