//! Wire messages of the order RPC surface.

use crate::domain::order::OrderItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderItemMessage {
    pub product_code: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl From<OrderItemMessage> for OrderItem {
    fn from(message: OrderItemMessage) -> Self {
        OrderItem::new(message.product_code, message.unit_price, message.quantity)
    }
}

impl From<OrderItem> for OrderItemMessage {
    fn from(item: OrderItem) -> Self {
        Self {
            product_code: item.product_code,
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    #[serde(default)]
    pub items: Vec<OrderItemMessage>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CreateOrderResponse {
    pub order_id: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GetOrderRequest {
    pub order_id: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GetOrderResponse {
    pub customer_id: i64,
    pub items: Vec<OrderItemMessage>,
}

/// A request addressed to one of the order operations.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    CreateOrder(CreateOrderRequest),
    GetOrder(GetOrderRequest),
}

/// Successful result of a [`Request`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum Reply {
    Created(CreateOrderResponse),
    Order(GetOrderResponse),
}
