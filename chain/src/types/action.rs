// chain/src/types/action.rs

//! The eight-step supply-chain workflow verb.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight canonical workflow verbs a batch progresses through.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Registered,
    QualityChecked,
    Shipped,
    Received,
    Stored,
    Delivered,
    ReceivedRetail,
    Sold,
}

/// Role prefix a given action's actor identity must begin with, case-insensitively.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Supplier,
    Distributor,
    Retailer,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Supplier => "supplier",
            Role::Distributor => "distributor",
            Role::Retailer => "retailer",
        }
    }
}

impl Action {
    /// The full, ordered workflow. `ALL[0]` has no predecessor.
    pub const ALL: [Action; 8] = [
        Action::Registered,
        Action::QualityChecked,
        Action::Shipped,
        Action::Received,
        Action::Stored,
        Action::Delivered,
        Action::ReceivedRetail,
        Action::Sold,
    ];

    /// The wire/canonical string form, e.g. `"quality_checked"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Registered => "registered",
            Action::QualityChecked => "quality_checked",
            Action::Shipped => "shipped",
            Action::Received => "received",
            Action::Stored => "stored",
            Action::Delivered => "delivered",
            Action::ReceivedRetail => "received_retail",
            Action::Sold => "sold",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// The action that must already have occurred for this batch.
    ///
    /// `None` for `registered`, the only action with no predecessor.
    pub fn predecessor(&self) -> Option<Action> {
        match self {
            Action::Registered => None,
            Action::QualityChecked => Some(Action::Registered),
            Action::Shipped => Some(Action::QualityChecked),
            Action::Received => Some(Action::Shipped),
            Action::Stored => Some(Action::Received),
            Action::Delivered => Some(Action::Stored),
            Action::ReceivedRetail => Some(Action::Delivered),
            Action::Sold => Some(Action::ReceivedRetail),
        }
    }

    /// The role expected to perform this action.
    pub fn expected_role(&self) -> Role {
        match self {
            Action::Registered | Action::QualityChecked | Action::Shipped => Role::Supplier,
            Action::Received | Action::Stored | Action::Delivered => Role::Distributor,
            Action::ReceivedRetail | Action::Sold => Role::Retailer,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_round_trip() {
        for action in Action::ALL {
            let s = action.as_str();
            assert_eq!(Action::from_str_opt(s), Some(action));
        }
    }

    #[test]
    fn only_registered_has_no_predecessor() {
        let without_pred: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|a| a.predecessor().is_none())
            .collect();
        assert_eq!(without_pred, vec![Action::Registered]);
    }

    #[test]
    fn predecessor_chain_matches_workflow_order() {
        for window in Action::ALL.windows(2) {
            let (prev, next) = (window[0], window[1]);
            assert_eq!(next.predecessor(), Some(prev));
        }
    }
}
