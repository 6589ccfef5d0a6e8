//! HTTP client for the payment service.

use crate::domain::context::Context;
use crate::domain::order::Order;
use crate::domain::ports::PaymentPort;
use crate::domain::status::{Code, Status};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Path of the charge endpoint, relative to the service base URL.
const CHARGE_ENDPOINT: &str = "/payments";

/// Upper bound for a single HTTP exchange, independent of the caller's budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a charge request.
#[derive(Debug, Serialize, PartialEq)]
pub struct CreatePaymentRequest {
    pub user_id: i64,
    pub order_id: u64,
    pub total_price: f32,
}

impl CreatePaymentRequest {
    pub fn from_order(order: &Order) -> Result<Self, Status> {
        let order_id = order
            .id
            .ok_or_else(|| Status::invalid_argument("order has not been persisted"))?;
        Ok(Self {
            user_id: order.customer_id,
            order_id,
            total_price: order.total_price(),
        })
    }
}

/// Charges orders against a remote payment service.
///
/// One HTTP request per `charge` call; retries are layered on top with
/// [`super::retry::RetryingPaymentClient`].
pub struct HttpPaymentClient {
    base_url: String,
    http_client: HttpClient,
}

impl HttpPaymentClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn charge_url(&self) -> String {
        format!("{}{}", self.base_url, CHARGE_ENDPOINT)
    }
}

#[async_trait]
impl PaymentPort for HttpPaymentClient {
    async fn charge(&self, _ctx: &Context, order: &Order) -> Result<(), Status> {
        let request = CreatePaymentRequest::from_order(order)?;

        debug!(
            order_id = request.order_id,
            user_id = request.user_id,
            total_price = request.total_price,
            "sending charge request"
        );

        let response = self
            .http_client
            .post(self.charge_url())
            .json(&request)
            .send()
            .await
            .map_err(transport_status)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.bytes().await.map_err(transport_status)?;
        Err(parse_error_response(status, &body))
    }
}

/// Classifies a failure to complete the HTTP exchange.
fn transport_status(error: reqwest::Error) -> Status {
    if error.is_timeout() {
        Status::deadline_exceeded(error.to_string())
    } else if error.is_connect() || error.is_request() {
        Status::unavailable(error.to_string())
    } else {
        Status::new(Code::Unknown, error.to_string())
    }
}

/// Decodes an error response.
///
/// The service answers with a JSON `Status`; when the body is anything else
/// the HTTP status code alone decides the classification.
pub fn parse_error_response(status: StatusCode, body: &[u8]) -> Status {
    match serde_json::from_slice::<Status>(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            let message = String::from_utf8_lossy(body).trim().to_string();
            let message = if message.is_empty() {
                status.to_string()
            } else {
                message
            };
            Status::new(code_for_http_status(status), message)
        }
    }
}

pub fn code_for_http_status(status: StatusCode) -> Code {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Code::InvalidArgument,
        StatusCode::UNAUTHORIZED => Code::Unauthenticated,
        StatusCode::FORBIDDEN | StatusCode::PAYMENT_REQUIRED => Code::PermissionDenied,
        StatusCode::NOT_FOUND => Code::NotFound,
        StatusCode::CONFLICT => Code::Aborted,
        StatusCode::PRECONDITION_FAILED => Code::FailedPrecondition,
        StatusCode::TOO_MANY_REQUESTS => Code::ResourceExhausted,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Code::DeadlineExceeded,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Code::Unavailable,
        s if s.is_server_error() => Code::Internal,
        _ => Code::Unknown,
    }
}
