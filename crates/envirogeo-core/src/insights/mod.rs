//! Insight Engine - turns statistics into short natural-language observations
//!
//! Output order is fixed:
//! 1. A trend sentence (always present)
//! 2. A variability sentence when the observed spread is unusually wide or narrow
//! 3. At most one parameter-specific sentence, chosen from the rule table

mod engine;
mod types;

pub use engine::{compute_insights, InsightEngine};
pub use types::InsightRule;
