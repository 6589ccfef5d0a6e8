use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// Orders are created `Pending`. The placement flow does not advance the
/// status after charging, so `Paid` and `Failed` are only ever read back from
/// records written by other tooling.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// A single line of an order.
///
/// Plain value data: it has no identity and is copied into storage together
/// with the order that owns it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderItem {
    pub product_code: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(product_code: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            product_code: product_code.into(),
            unit_price,
            quantity,
        }
    }
}

/// An order placed by a customer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Order {
    /// Assigned by the order store on a successful save, `None` before that.
    pub id: Option<u64>,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Seconds since the Unix epoch.
    pub created_at: i64,
}

impl Order {
    /// Builds a new `Pending` order stamped with the current time.
    ///
    /// Items are accepted as given; prices and quantities are not validated here.
    pub fn new(customer_id: i64, items: Vec<OrderItem>) -> Self {
        Self {
            id: None,
            customer_id,
            status: OrderStatus::Pending,
            items,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Sum of `unit_price * quantity` over all items.
    ///
    /// Computed in `f32` because that is how the payment service reads the
    /// price; widening this would change the charged amounts.
    pub fn total_price(&self) -> f32 {
        self.items
            .iter()
            .map(|item| item.quantity as f32 * item.unit_price.to_f32().unwrap_or_default())
            .sum()
    }
}
