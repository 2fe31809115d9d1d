use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Order lifecycle.
///
/// `Pending → Paid → Processing → Shipped → Delivered`, with `Cancelled`
/// reachable from every non-terminal state. Forward moves may skip states;
/// backward and same-state moves are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Processing => 2,
            OrderStatus::Shipped => 3,
            OrderStatus::Delivered => 4,
            OrderStatus::Cancelled => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }

        next == OrderStatus::Cancelled || next.rank() > self.rank()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                let valid = OrderStatus::ALL.map(|s| s.as_str()).join(", ");
                ServiceError::validation(format!(
                    "Invalid status '{value}'. Valid statuses: {valid}"
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i32,
    pub user_id: String,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Line snapshot taken when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub order_item_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn forward_moves_are_allowed_including_skips() {
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Delivered));
    }

    #[test]
    fn cancel_is_reachable_from_every_open_state() {
        for status in [Pending, Paid, Processing, Shipped] {
            assert!(status.can_transition_to(Cancelled), "{status} -> Cancelled");
        }
    }

    #[test]
    fn backward_same_state_and_terminal_moves_are_rejected() {
        assert!(!Shipped.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        for next in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn parses_only_known_statuses() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), Shipped);
        assert_eq!(" Paid ".parse::<OrderStatus>().unwrap(), Paid);
        assert!(matches!(
            "Lost".parse::<OrderStatus>(),
            Err(ServiceError::Validation(_))
        ));
        assert!("".parse::<OrderStatus>().is_err());
    }
}
