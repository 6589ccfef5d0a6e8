#![allow(dead_code)]

use async_trait::async_trait;
use orderflow::domain::context::Context;
use orderflow::domain::order::{Order, OrderItem};
use orderflow::domain::ports::{OrderStore, PaymentPort};
use orderflow::domain::status::Status;
use orderflow::error::StoreError;
use orderflow::infrastructure::in_memory::InMemoryOrderStore;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered record of the calls made against the test doubles.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<&'static str>>>);

impl EventLog {
    pub fn push(&self, event: &'static str) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

/// In-memory store that logs every call and can be told to fail saves or to
/// answer slowly.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub inner: InMemoryOrderStore,
    pub log: EventLog,
    pub fail_saves: bool,
    pub latency: Option<Duration>,
}

impl RecordingStore {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing(log: EventLog) -> Self {
        Self {
            log,
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl OrderStore for RecordingStore {
    async fn save(&self, order: &mut Order) -> Result<(), StoreError> {
        self.log.push("save");
        self.pause().await;
        if self.fail_saves {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        self.inner.save(order).await
    }

    async fn get(&self, id: u64) -> Result<Order, StoreError> {
        self.log.push("get");
        self.pause().await;
        self.inner.get(id).await
    }
}

/// Payment double that fails with the scripted statuses, one per call, and
/// succeeds once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedPayment {
    pub failures: Vec<Status>,
    pub calls: Arc<AtomicU32>,
    pub log: EventLog,
    pub latency: Option<Duration>,
}

impl ScriptedPayment {
    pub fn new(log: EventLog, failures: Vec<Status>) -> Self {
        Self {
            failures,
            log,
            ..Self::default()
        }
    }

    pub fn approving(log: EventLog) -> Self {
        Self::new(log, Vec::new())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentPort for ScriptedPayment {
    async fn charge(&self, _ctx: &Context, _order: &Order) -> Result<(), Status> {
        self.log.push("charge");
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.get(call) {
            Some(status) => Err(status.clone()),
            None => Ok(()),
        }
    }
}

pub fn sample_items() -> Vec<OrderItem> {
    vec![OrderItem::new("A1", dec!(10.0), 2)]
}
