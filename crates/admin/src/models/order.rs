//! Orders as the back-office sees them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boutique_core::{CustomerId, OrderId, OrderStatus, ProductId, StatusTransitionError};

/// One purchased line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A recorded status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
    /// Operator who made the change.
    pub by: String,
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub email: String,
    pub shipping_address: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub history: Vec<StatusChange>,
}

impl Order {
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the order counts towards what its customer has spent.
    #[must_use]
    pub const fn counts_towards_spend(&self) -> bool {
        !matches!(
            self.status,
            OrderStatus::Cancelled | OrderStatus::Returned | OrderStatus::Refunding
        )
    }

    /// Move the order to `to` and record the change.
    ///
    /// With `enforce` set, only transitions listed in the workflow table are
    /// accepted; otherwise any status may follow any other. Setting the
    /// current status again is a no-op. Returns whether the status changed.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError`] when enforcing and the table does
    /// not list `to` as a successor of the current status.
    pub fn change_status(
        &mut self,
        to: OrderStatus,
        enforce: bool,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StatusTransitionError> {
        if to == self.status {
            return Ok(false);
        }
        if enforce {
            self.status.transition_to(to)?;
        }
        self.history.push(StatusChange {
            from: self.status,
            to,
            at,
            by: by.to_string(),
        });
        self.status = to;
        Ok(true)
    }
}
