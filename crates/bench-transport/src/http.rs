//! HTTP transport.
//!
//! The receiver hosts `POST /buffer` and queues each request body; the
//! sender POSTs one buffer per request. The queue is bounded and the handler
//! only answers once its body is queued, so a slow receiver back-pressures
//! the sender.

use crate::channel::{Receiver, Sender};
use crate::error::TransportError;
use async_trait::async_trait;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Path buffers are posted to.
pub const BUFFER_PATH: &str = "/buffer";

/// Buffers accepted by the receiver but not yet drained.
const QUEUE_DEPTH: usize = 4;

/// How long close waits for in-flight requests before aborting the server.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Sender that POSTs buffers to an [`HttpReceiver`].
pub struct HttpSender {
    client: reqwest::Client,
    url: String,
    closed: bool,
}

impl HttpSender {
    /// Create a sender targeting the receiver at `host:port`.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("http://{host}:{port}{BUFFER_PATH}"),
            closed: false,
        }
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&mut self, buffer: Bytes) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let response = self
            .client
            .post(&self.url)
            .body(buffer)
            .send()
            .await
            .map_err(|e| TransportError::Http(format!("Failed to POST to {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http(format!(
                "POST to {} failed with status {status}",
                self.url
            )));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        debug!("HTTP sender for {} closed", self.url);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Receiver hosting the HTTP endpoint senders post to.
pub struct HttpReceiver {
    local_addr: SocketAddr,
    buffers: mpsc::Receiver<Bytes>,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<std::io::Result<()>>>,
}

impl HttpReceiver {
    /// Bind the endpoint on `host:port` and start serving. Port 0 picks a
    /// free port, see [`HttpReceiver::local_addr`].
    pub async fn bind(host: &str, port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| TransportError::InvalidAddress(format!("{host}:{port}: {e}")))?;
        let local_addr = listener.local_addr()?;

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let app = Router::new()
            .route(BUFFER_PATH, post(accept_buffer))
            .layer(DefaultBodyLimit::disable())
            .with_state(tx);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("HTTP receiver listening on {}", local_addr);

        Ok(Self {
            local_addr,
            buffers: rx,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        })
    }

    /// Address the endpoint is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

async fn accept_buffer(State(buffers): State<mpsc::Sender<Bytes>>, body: Bytes) -> StatusCode {
    match buffers.send(body).await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[async_trait]
impl Receiver for HttpReceiver {
    async fn receive(&mut self, max_size: usize) -> Result<Bytes, TransportError> {
        let buffer = self.buffers.recv().await.ok_or(TransportError::Closed)?;
        if buffer.len() > max_size {
            return Err(TransportError::Oversized {
                size: buffer.len(),
                max_size,
            });
        }
        Ok(buffer)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Refuse anything still in flight, then stop the server.
        self.buffers.close();
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        let Some(mut server) = self.server.take() else {
            return Ok(());
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(TransportError::Http(format!("HTTP server task failed: {e}")));
            }
            Err(_) => {
                warn!(
                    "HTTP receiver on {} did not shut down within {:?}, aborting",
                    self.local_addr, SHUTDOWN_GRACE
                );
                server.abort();
            }
        }
        debug!("HTTP receiver on {} closed", self.local_addr);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
