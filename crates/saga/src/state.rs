//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order over one placement saga.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Placed   (full saga success)
///           └──► Failed   (saga abort; no durable row survives)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Draft built in memory; nothing durable yet, or the durable row
    /// is still mid-saga.
    #[default]
    Pending,

    /// Saga finished; the durable order is live (terminal state).
    Placed,

    /// Saga aborted; any durable row was compensated away (terminal
    /// state).
    Failed,
}

impl OrderStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Placed => "Placed",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Placed" => Ok(OrderStatus::Placed),
            "Failed" => Ok(OrderStatus::Failed),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Placed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn display_and_parse_roundtrip() {
        for status in [OrderStatus::Pending, OrderStatus::Placed, OrderStatus::Failed] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }
}
