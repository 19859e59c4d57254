//! Progress of a long running operation

use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Progress meter.
///
/// Only the operation name and the completed fraction go over the wire; the
/// expected and current counts stay with the producer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub operation: String,
    pub amount: f32,
    #[serde(skip)]
    expected: u64,
    #[serde(skip)]
    count: u64,
}

impl Progress {
    /// Start tracking `operation`, expecting `expected` steps
    pub fn new(operation: impl Into<String>, expected: u64) -> Self {
        let mut progress = Self {
            operation: operation.into(),
            ..Default::default()
        };
        progress.restart(expected);
        progress
    }

    /// Progress as seen by a subscriber: a completed fraction without counts
    pub fn with_amount(operation: impl Into<String>, amount: f32) -> Self {
        Self {
            operation: operation.into(),
            amount: amount.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Reset the count and set a new number of expected steps
    pub fn restart(&mut self, expected: u64) {
        self.expected = expected;
        self.count = 0;
        self.update_amount();
    }

    /// Advance by `increment` steps. Returns the new count.
    pub fn advance(&mut self, increment: u64) -> u64 {
        self.count = self.count.saturating_add(increment);
        self.update_amount();
        self.count
    }

    pub fn increment(&mut self) -> u64 {
        self.advance(1)
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_done(&self) -> bool {
        self.amount >= 1.0
    }

    fn update_amount(&mut self) {
        self.amount = if self.expected == 0 {
            1.0
        } else {
            (self.count as f64 / self.expected as f64).min(1.0) as f32
        };
    }
}

impl AddAssign<u64> for Progress {
    fn add_assign(&mut self, increment: u64) {
        self.advance(increment);
    }
}

impl Topic for Progress {
    const TYPE_NAME: &'static str = "lumos::data::Progress";
}
