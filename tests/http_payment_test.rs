use orderflow::domain::context::Context;
use orderflow::domain::order::{Order, OrderItem};
use orderflow::domain::ports::PaymentPort;
use orderflow::domain::status::{Code, FieldViolation};
use orderflow::infrastructure::payment::{HttpPaymentClient, RetryPolicy, RetryingPaymentClient};
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Requests seen by the fake payment service, one JSON body per connection.
#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<Value>>>);

impl Received {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn last(&self) -> Value {
        self.0.lock().unwrap().last().cloned().unwrap()
    }
}

/// Reads one HTTP request and returns its body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return text[end + 4..].to_string();
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Starts a payment service that answers the n-th connection with the n-th
/// scripted response, and with `200 {}` once the script runs out.
async fn fake_payment_service(script: Vec<(u16, &'static str)>) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Received::default();
    let seen = received.clone();
    let next = Arc::new(AtomicUsize::new(0));

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (code, body) = script
                .get(next.fetch_add(1, Ordering::SeqCst))
                .copied()
                .unwrap_or((200, "{}"));

            let request = read_request(&mut socket).await;
            seen.0
                .lock()
                .unwrap()
                .push(serde_json::from_str(&request).unwrap_or(Value::Null));

            let status = StatusCode::from_u16(code).unwrap();
            let response = format!(
                "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                code,
                status.canonical_reason().unwrap_or("Unknown"),
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{addr}"), received)
}

fn persisted_order() -> Order {
    let mut order = Order::new(42, vec![OrderItem::new("A1", dec!(10.0), 2)]);
    order.id = Some(7);
    order
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(1),
        ..RetryPolicy::default()
    }
}

#[tokio::test]
async fn test_unavailable_responses_are_retried_until_success() {
    let (url, received) = fake_payment_service(vec![(503, ""), (503, "")]).await;
    let client = RetryingPaymentClient::new(HttpPaymentClient::new(url).unwrap(), fast_policy());

    client
        .charge(&Context::background(), &persisted_order())
        .await
        .unwrap();

    assert_eq!(received.count(), 3);
    let body = received.last();
    assert_eq!(body["user_id"], 42);
    assert_eq!(body["order_id"], 7);
    assert_eq!(body["total_price"], 20.0);
}

#[tokio::test]
async fn test_structured_rejection_keeps_violations() {
    let rejection = r#"{"code":"invalid-argument","message":"charge rejected","violations":[{"field":"balance","description":"insufficient funds"}]}"#;
    let (url, received) = fake_payment_service(vec![(400, rejection)]).await;
    let client = RetryingPaymentClient::new(HttpPaymentClient::new(url).unwrap(), fast_policy());

    let status = client
        .charge(&Context::background(), &persisted_order())
        .await
        .unwrap_err();

    assert_eq!(status.code, Code::InvalidArgument);
    assert_eq!(status.message, "charge rejected");
    assert_eq!(
        status.violations,
        vec![FieldViolation::new("balance", "insufficient funds")]
    );
    assert_eq!(received.count(), 1);
}

#[tokio::test]
async fn test_refused_connection_is_unavailable() {
    let client = HttpPaymentClient::new("http://127.0.0.1:1").unwrap();

    let status = client
        .charge(&Context::background(), &persisted_order())
        .await
        .unwrap_err();

    assert_eq!(status.code, Code::Unavailable);
}
