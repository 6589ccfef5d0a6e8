use super::context::Context;
use super::order::Order;
use super::status::Status;
use crate::error::{OrderError, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable storage for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists `order` and assigns its id. The id is written exactly once,
    /// and only when the save succeeds.
    async fn save(&self, order: &mut Order) -> Result<(), StoreError>;
    /// Fetches an order, failing with `StoreError::NotFound` for unknown ids.
    async fn get(&self, id: u64) -> Result<Order, StoreError>;
}

/// Charges a customer for an order against the payment service.
#[async_trait]
pub trait PaymentPort: Send + Sync {
    async fn charge(&self, ctx: &Context, order: &Order) -> Result<(), Status>;
}

/// The operations the transport layer drives.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn place_order(&self, ctx: &Context, order: Order) -> Result<Order, OrderError>;
    async fn get_order(&self, ctx: &Context, id: u64) -> Result<Order, OrderError>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type PaymentPortBox = Box<dyn PaymentPort>;
pub type SharedOrderApi = Arc<dyn OrderApi>;
