use crate::domain::context::Context;
use crate::domain::order::Order;
use crate::domain::ports::{OrderStore, PaymentPort};
use crate::domain::status::Status;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A thread-safe in-memory order store.
///
/// Ids are handed out sequentially starting at 1. Cloning shares the
/// underlying map, which makes it handy for tests that need to inspect what
/// the service persisted.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<u64, Order>>>,
    last_id: Arc<AtomicU64>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, order: &mut Order) -> Result<(), StoreError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = order.clone();
        stored.id = Some(id);

        self.orders.write().await.insert(id, stored);
        order.id = Some(id);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Order, StoreError> {
        let orders = self.orders.read().await;
        orders.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }
}

/// A charge accepted by [`InMemoryPaymentLedger`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRecord {
    pub order_id: u64,
    pub customer_id: i64,
    pub total_price: f32,
}

/// Local payment backend that approves every charge and records it.
///
/// Used when no payment service is configured.
#[derive(Default, Clone)]
pub struct InMemoryPaymentLedger {
    charges: Arc<RwLock<Vec<ChargeRecord>>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges accepted so far, in arrival order.
    pub async fn charges(&self) -> Vec<ChargeRecord> {
        self.charges.read().await.clone()
    }
}

#[async_trait]
impl PaymentPort for InMemoryPaymentLedger {
    async fn charge(&self, _ctx: &Context, order: &Order) -> Result<(), Status> {
        let order_id = order
            .id
            .ok_or_else(|| Status::invalid_argument("order has not been persisted"))?;
        let record = ChargeRecord {
            order_id,
            customer_id: order.customer_id,
            total_price: order.total_price(),
        };

        debug!(order_id, total_price = record.total_price, "charge recorded");
        self.charges.write().await.push(record);
        Ok(())
    }
}
