use crate::domain::status::Status;
use crate::error::{AppError, Result};
use crate::interfaces::jsonl::{Outcome, ResponseEnvelope, encode_response, parse_request};
use crate::interfaces::rpc::OrderHandler;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

/// Responses queued per connection before request handling waits on the writer.
const RESPONSE_BUFFER: usize = 64;

/// Requests handled concurrently per connection; further lines are not read
/// until one of them finishes.
pub const MAX_IN_FLIGHT: usize = 32;

/// Accepts connections on `listener` and serves line-delimited JSON requests.
///
/// Every request runs on its own task; responses are written back in the
/// order they complete, carrying the request's `id` when one was given.
pub async fn serve(listener: TcpListener, handler: OrderHandler) -> Result<()> {
    serve_with_limit(listener, handler, MAX_IN_FLIGHT).await
}

/// Like [`serve`], with an explicit cap on in-flight requests per connection.
pub async fn serve_with_limit(
    listener: TcpListener,
    handler: OrderHandler,
    max_in_flight: usize,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, max_in_flight, "order service listening");

    loop {
        let (socket, peer) = listener.accept().await?;
        let handler = handler.clone();

        tokio::spawn(async move {
            debug!(%peer, "connection accepted");
            if let Err(e) = handle_connection(socket, handler, max_in_flight).await {
                warn!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}

fn malformed(reason: impl std::fmt::Display) -> ResponseEnvelope {
    ResponseEnvelope::new(
        None,
        Outcome::Error(Status::invalid_argument(format!("malformed request: {reason}"))),
    )
}

async fn send(tx: &mpsc::Sender<String>, response: &ResponseEnvelope) {
    match encode_response(response) {
        Ok(encoded) => {
            if tx.send(encoded).await.is_err() {
                debug!("connection gone before response was written");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode response"),
    }
}

async fn handle_connection(
    socket: TcpStream,
    handler: OrderHandler,
    max_in_flight: usize,
) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let (tx, mut rx) = mpsc::channel::<String>(RESPONSE_BUFFER);
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
        }
        writer.shutdown().await
    });

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        // Invalid UTF-8 is answered like any other undecodable line.
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                send(&tx, &malformed(e)).await;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let envelope = match parse_request(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                send(&tx, &malformed(e)).await;
                continue;
            }
        };

        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        let tx = tx.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let result = handler.handle(envelope.request).await;
            drop(permit);
            send(&tx, &ResponseEnvelope::new(envelope.id, result)).await;
        });
    }

    drop(tx);
    writer_task
        .await
        .map_err(|e| AppError::Io(std::io::Error::other(e)))??;
    Ok(())
}
