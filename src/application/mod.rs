//! Application services (use cases).
//!
//! These services combine domain logic with the outbound ports to match
//! options, evaluate prices and record opportunities.

pub mod batch;
pub mod cache;
pub mod evaluator;
pub mod ingest;
pub mod ledger;
pub mod lifecycle;
pub mod matcher;
pub mod normalizer;
