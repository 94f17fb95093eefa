//! Order status values.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment order.
///
/// The backend reports status as a free-form string; values outside the
/// documented set map to [`OrderStatus::Unknown`] so a new server-side state
/// never breaks a shipped client. Callers that need to react to new states
/// can match on `Unknown` and inspect the raw response themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, payment not yet made.
    New,
    /// Payment received, content not yet delivered.
    Paid,
    /// Payment received and content delivered.
    Done,
    /// Any status string this SDK version does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Map a raw status string to a status value.
    ///
    /// Returns `None` for unrecognized strings so the caller can decide how
    /// loudly to handle them; the wire layer logs a warning and falls back to
    /// [`OrderStatus::Unknown`].
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(Self::New),
            "paid" => Some(Self::Paid),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Paid => write!(f, "paid"),
            Self::Done => write!(f, "done"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_known_values() {
        assert_eq!(OrderStatus::from_wire("new"), Some(OrderStatus::New));
        assert_eq!(OrderStatus::from_wire("paid"), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::from_wire("done"), Some(OrderStatus::Done));
    }

    #[test]
    fn test_from_wire_unknown_value() {
        assert_eq!(OrderStatus::from_wire("pending_review"), None);
        assert_eq!(OrderStatus::from_wire(""), None);
    }

    #[test]
    fn test_display_round_trip() {
        for status in [OrderStatus::New, OrderStatus::Paid, OrderStatus::Done] {
            assert_eq!(OrderStatus::from_wire(&status.to_string()), Some(status));
        }
    }
}
