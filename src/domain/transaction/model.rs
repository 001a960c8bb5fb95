//! Transaction domain entity

use serde::Serialize;

/// A purchased item and what it cost.
///
/// Instances only come out of
/// [`validate_transaction`](crate::application::validation::validate_transaction),
/// so holding a `Transaction` means `item` is 1–500 characters and
/// `cost` is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    item: String,
    cost: f64,
}

impl Transaction {
    pub(crate) fn new_unchecked(item: String, cost: f64) -> Self {
        Self { item, cost }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }
}
