use super::messages::{
    CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse, OrderItemMessage,
    Reply, Request,
};
use crate::domain::context::Context;
use crate::domain::order::Order;
use crate::domain::ports::SharedOrderApi;
use crate::domain::status::Status;
use std::time::Duration;
use tracing::{Instrument, info_span, warn};

/// Budget for each blocking call made while serving one request.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Decodes RPC requests into [`crate::domain::ports::OrderApi`] calls and
/// encodes the results.
///
/// Cheap to clone; clones share the same service.
#[derive(Clone)]
pub struct OrderHandler {
    api: SharedOrderApi,
    call_timeout: Duration,
}

impl OrderHandler {
    pub fn new(api: SharedOrderApi) -> Self {
        Self {
            api,
            call_timeout: CALL_TIMEOUT,
        }
    }

    fn context(&self, span: tracing::Span) -> Context {
        Context::with_timeout(self.call_timeout).with_span(span)
    }

    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, Status> {
        let span = info_span!("create_order", customer_id = request.customer_id);
        let ctx = self.context(span.clone());

        async {
            let items = request.items.into_iter().map(Into::into).collect();
            let order = Order::new(request.customer_id, items);

            match self.api.place_order(&ctx, order).await {
                Ok(placed) => placed
                    .id
                    .map(|order_id| CreateOrderResponse { order_id })
                    .ok_or_else(|| Status::internal("order was not assigned an id")),
                Err(e) => {
                    warn!(error = %e, "order placement failed");
                    Err(e.to_status())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn get_order(&self, request: GetOrderRequest) -> Result<GetOrderResponse, Status> {
        let span = info_span!("get_order", order_id = request.order_id);
        let ctx = self.context(span.clone());

        async {
            let order = self
                .api
                .get_order(&ctx, request.order_id)
                .await
                .map_err(|e| e.to_status())?;

            Ok::<_, Status>(GetOrderResponse {
                customer_id: order.customer_id,
                items: order.items.into_iter().map(OrderItemMessage::from).collect(),
            })
        }
        .instrument(span)
        .await
    }

    /// Routes a decoded request to the matching operation.
    pub async fn handle(&self, request: Request) -> Result<Reply, Status> {
        match request {
            Request::CreateOrder(request) => self.create_order(request).await.map(Reply::Created),
            Request::GetOrder(request) => self.get_order(request).await.map(Reply::Order),
        }
    }
}
