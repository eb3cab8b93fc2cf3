//! Core types for the Insight Engine

use std::fmt;

use crate::models::Stats;

/// A threshold test paired with the sentence it produces
#[derive(Clone, Copy)]
pub struct InsightRule {
    /// Short identifier used in logs
    pub key: &'static str,
    /// Whether this rule applies to the statistics
    pub applies: fn(&Stats) -> bool,
    /// Sentence emitted when the rule applies
    pub message: &'static str,
}

impl InsightRule {
    pub const fn new(key: &'static str, applies: fn(&Stats) -> bool, message: &'static str) -> Self {
        Self {
            key,
            applies,
            message,
        }
    }
}

impl fmt::Debug for InsightRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightRule")
            .field("key", &self.key)
            .field("message", &self.message)
            .finish()
    }
}
