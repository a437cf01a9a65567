//! Order status and its transition table.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order status as shown in the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipping,
    Completed,
    Cancelled,
    Returned,
    Refunding,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Processing,
        Self::Shipping,
        Self::Completed,
        Self::Cancelled,
        Self::Returned,
        Self::Refunding,
    ];

    /// Stable machine name, used in URLs and forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
            Self::Refunding => "refunding",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipping => "Shipping",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::Refunding => "Refunding",
        }
    }

    /// Statuses reachable in one step.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipping, Self::Cancelled],
            Self::Shipping => &[Self::Completed, Self::Returned],
            Self::Completed => &[Self::Returned],
            Self::Returned => &[Self::Refunding],
            Self::Refunding | Self::Cancelled => &[],
        }
    }

    /// Whether the transition table lists `to` as a successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next_statuses().contains(&to)
    }

    /// Validate a transition against the table.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] when `to` is not a listed successor.
    pub fn transition_to(self, to: Self) -> Result<Self, StatusTransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(StatusTransitionError { from: self, to })
        }
    }

    /// Terminal statuses have no successors.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Orders in this status count towards revenue.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("archived".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_happy_path_is_legal() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipping,
            OrderStatus::Completed,
            OrderStatus::Returned,
            OrderStatus::Refunding,
        ];
        for pair in path.windows(2) {
            if let [from, to] = pair {
                assert!(from.can_transition_to(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_successors() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Refunding.is_terminal());
        assert!(!OrderStatus::Completed.is_terminal());
        for to in OrderStatus::ALL {
            assert!(!OrderStatus::Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn test_transition_to_rejects_skips() {
        let err = OrderStatus::Pending
            .transition_to(OrderStatus::Completed)
            .expect_err("skip is illegal");
        assert_eq!(err.from, OrderStatus::Pending);
        assert_eq!(err.to, OrderStatus::Completed);
        assert_eq!(err.to_string(), "cannot move order from pending to completed");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Refunding).expect("serialize");
        assert_eq!(json, "\"refunding\"");
    }
}
