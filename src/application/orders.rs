use crate::domain::context::Context;
use crate::domain::order::Order;
use crate::domain::ports::{OrderApi, OrderStoreBox, PaymentPortBox};
use crate::domain::status::{Code, FieldViolation, Status};
use crate::error::OrderError;
use async_trait::async_trait;
use tracing::{Instrument, info, info_span, warn};

/// Field name the aggregated payment violation is reported under.
pub const PAYMENT_FIELD: &str = "payment";

/// Places orders and looks them up.
///
/// `OrderService` persists the order first and only then charges the
/// customer. It keeps no mutable state of its own: every call touches only the
/// order it was given, so a single instance can be shared across concurrent
/// requests.
pub struct OrderService {
    store: OrderStoreBox,
    payment: PaymentPortBox,
}

impl OrderService {
    /// Creates a new `OrderService`.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable storage for orders.
    /// * `payment` - The payment client used to charge placed orders.
    pub fn new(store: OrderStoreBox, payment: PaymentPortBox) -> Self {
        Self { store, payment }
    }

    /// Persists `order`, then charges it.
    ///
    /// Store failures are returned unchanged and no charge is attempted. A
    /// declined charge does not remove the persisted order; it is reported as
    /// a single `invalid-argument` error (see [`payment_declined`]). The
    /// returned order keeps its `Pending` status either way.
    pub async fn place_order(&self, ctx: &Context, mut order: Order) -> Result<Order, OrderError> {
        let span = info_span!(
            parent: ctx.span(),
            "place_order",
            customer_id = order.customer_id,
            order_id = tracing::field::Empty
        );

        async {
            ctx.bound(self.store.save(&mut order))
                .await
                .map_err(|_| OrderError::DeadlineExceeded)??;

            if let Some(id) = order.id {
                tracing::Span::current().record("order_id", id);
            }
            info!(total_price = order.total_price(), "order persisted, charging");

            match self.payment.charge(ctx, &order).await {
                Ok(()) => {
                    info!("order charged");
                    Ok(order)
                }
                Err(status) if status.code == Code::DeadlineExceeded => {
                    warn!(error = %status, "charge timed out");
                    Err(OrderError::DeadlineExceeded)
                }
                Err(status) => {
                    warn!(error = %status, "charge declined");
                    Err(OrderError::PaymentDeclined(payment_declined(&status)))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fetches an order by id; store errors, including not-found, are
    /// returned unchanged.
    pub async fn get_order(&self, ctx: &Context, id: u64) -> Result<Order, OrderError> {
        let span = info_span!(parent: ctx.span(), "get_order", order_id = id);

        async {
            let order = ctx
                .bound(self.store.get(id))
                .await
                .map_err(|_| OrderError::DeadlineExceeded)??;
            Ok::<_, OrderError>(order)
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl OrderApi for OrderService {
    async fn place_order(&self, ctx: &Context, order: Order) -> Result<Order, OrderError> {
        OrderService::place_order(self, ctx, order).await
    }

    async fn get_order(&self, ctx: &Context, id: u64) -> Result<Order, OrderError> {
        OrderService::get_order(self, ctx, id).await
    }
}

/// Collapses a payment failure into the error reported for the order.
///
/// Every violation description carried by `status` is joined, one per line,
/// into a single violation on the `payment` field. A status without
/// violations yields an empty description.
pub fn payment_declined(status: &Status) -> Status {
    let description = status
        .violations
        .iter()
        .map(|violation| violation.description.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Status::invalid_argument("order creation failed")
        .with_violations(vec![FieldViolation::new(PAYMENT_FIELD, description)])
}
