use clap::Parser;
use miette::{IntoDiagnostic, Result};
use orderflow::application::orders::OrderService;
use orderflow::config::{Command, Config};
use orderflow::domain::ports::{OrderStoreBox, PaymentPortBox};
use orderflow::infrastructure::in_memory::{InMemoryOrderStore, InMemoryPaymentLedger};
use orderflow::infrastructure::payment::{HttpPaymentClient, RetryingPaymentClient};
use orderflow::interfaces::jsonl::{RequestReader, ResponseEnvelope, ResponseWriter};
use orderflow::interfaces::rpc::OrderHandler;
use orderflow::interfaces::server;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    if config.is_development() {
        builder.init();
    } else {
        builder.json().flatten_event(true).with_current_span(true).init();
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent_store(path: &Path) -> Result<OrderStoreBox> {
    use orderflow::infrastructure::rocksdb::RocksDBOrderStore;

    info!(path = %path.display(), "using RocksDB order store");
    let store = RocksDBOrderStore::open(path).into_diagnostic()?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent_store(path: &Path) -> Result<OrderStoreBox> {
    warn!(
        path = %path.display(),
        "WARNING: Persistent storage requested via DATA_SOURCE_URL, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(Box::new(InMemoryOrderStore::new()))
}

fn order_store(config: &Config) -> Result<OrderStoreBox> {
    match &config.data_source_url {
        Some(path) => open_persistent_store(path),
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

fn payment_client(config: &Config) -> Result<PaymentPortBox> {
    match &config.payment_service_url {
        Some(url) => {
            info!(url = %url, "using remote payment service");
            let client = HttpPaymentClient::new(url.as_str()).into_diagnostic()?;
            Ok(Box::new(RetryingPaymentClient::with_default_policy(client)))
        }
        None => {
            warn!("No PAYMENT_SERVICE_URL configured. Charges are recorded in-memory.");
            Ok(Box::new(InMemoryPaymentLedger::new()))
        }
    }
}

async fn run(handler: &OrderHandler, input: PathBuf) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let reader = RequestReader::new(BufReader::new(file));

    let stdout = io::stdout();
    let mut writer = ResponseWriter::new(stdout.lock());

    for request in reader.requests() {
        match request {
            Ok(envelope) => {
                let result = handler.handle(envelope.request).await;
                let response = ResponseEnvelope::new(envelope.id, result);
                writer.write_response(&response).into_diagnostic()?;
            }
            Err(e) => {
                error!(error = %e, "Error reading request");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_tracing(&config);

    let service = OrderService::new(order_store(&config)?, payment_client(&config)?);
    let handler = OrderHandler::new(Arc::new(service));

    match config.command {
        Command::Run { input } => run(&handler, input).await,
        Command::Serve { port } => {
            let listener = TcpListener::bind(("0.0.0.0", port))
                .await
                .into_diagnostic()?;

            tokio::select! {
                result = server::serve(listener, handler) => result.into_diagnostic(),
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    Ok(())
                }
            }
        }
    }
}
