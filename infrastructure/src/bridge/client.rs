//! JSON-RPC client with a single background reader.
//!
//! The reader task owns the read half exclusively and fulfils pending
//! requests by id through `oneshot` channels. Writes are serialised by a
//! mutex. When the stream ends every pending request fails with
//! [`BridgeError::TransportClosed`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::error::{BridgeError, Result};
use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use super::transport::{MessageKind, classify_message, read_frame, write_frame};

type PendingMap = HashMap<u64, oneshot::Sender<JsonRpcResponse>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct BridgeClient {
    writer: Mutex<BoxedWriter>,
    pending: Arc<Mutex<PendingMap>>,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    reader_handle: JoinHandle<()>,
}

impl BridgeClient {
    /// Start the background reader over `reader` and return the client.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let pending_bg = Arc::clone(&pending);
        let closed_bg = Arc::clone(&closed);
        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(BufReader::new(reader), pending_bg, closed_bg).await;
        });

        Self {
            writer: Mutex::new(Box::new(writer)),
            pending,
            closed,
            next_id: AtomicU64::new(1),
            reader_handle,
        }
    }

    /// Whether the reader has seen the end of the stream
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a request and wait for its result, or for cancellation.
    pub async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        cancellation: &CancellationToken,
    ) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);
        let body = serde_json::to_vec(&request)?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        // The reader marks the client closed before draining the map, so a
        // request registered after the drain is caught here.
        if self.is_closed() {
            self.pending.lock().await.remove(&id);
            return Err(BridgeError::TransportClosed);
        }

        trace!(id, method, "Bridge sending request");
        let sent = {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, &body).await
        };
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                self.pending.lock().await.remove(&id);
                debug!(id, method, "Bridge request cancelled");
                return Err(BridgeError::Cancelled);
            }
            response = rx => response.map_err(|_| BridgeError::TransportClosed)?,
        };

        match response.error {
            Some(error) => Err(BridgeError::RpcError {
                code: error.code,
                message: error.message,
            }),
            None => Ok(response.result.unwrap_or(serde_json::Value::Null)),
        }
    }

    async fn reader_loop<R>(
        mut reader: BufReader<R>,
        pending: Arc<Mutex<PendingMap>>,
        closed: Arc<AtomicBool>,
    ) where
        R: AsyncRead + Unpin,
    {
        loop {
            let body = match read_frame(&mut reader).await {
                Ok(Some(body)) => body,
                Ok(None) => {
                    debug!("Bridge reader: stream closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Bridge reader: failed to read frame");
                    break;
                }
            };

            let json: serde_json::Value = match serde_json::from_slice(&body) {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "Bridge reader: failed to parse JSON");
                    continue;
                }
            };

            match classify_message(&json) {
                MessageKind::Response { id } => {
                    let response: JsonRpcResponse = match serde_json::from_value(json) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!(id, error = %e, "Bridge reader: malformed response");
                            continue;
                        }
                    };
                    let sender = pending.lock().await.remove(&id);
                    match sender {
                        Some(tx) => {
                            let _ = tx.send(response);
                        }
                        None => debug!(id, "Bridge reader: no pending request for response"),
                    }
                }
                MessageKind::IncomingRequest { id } => {
                    debug!(id, "Bridge reader: ignoring server-initiated request");
                }
                MessageKind::Notification => {
                    trace!("Bridge reader: ignoring notification");
                }
            }
        }

        closed.store(true, Ordering::SeqCst);
        pending.lock().await.clear();
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::METHOD_NOT_FOUND;
    use std::time::Duration;
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

    /// Server side of a duplex pipe answering with `respond`.
    fn serve<F>(stream: DuplexStream, respond: F)
    where
        F: Fn(&JsonRpcRequest) -> Option<JsonRpcResponse> + Send + 'static,
    {
        tokio::spawn(async move {
            let (read_half, mut write_half): (ReadHalf<DuplexStream>, WriteHalf<DuplexStream>) =
                tokio::io::split(stream);
            let mut reader = BufReader::new(read_half);
            while let Ok(Some(body)) = read_frame(&mut reader).await {
                let request: JsonRpcRequest = serde_json::from_slice(&body).unwrap();
                if let Some(response) = respond(&request) {
                    let out = serde_json::to_vec(&response).unwrap();
                    write_frame(&mut write_half, &out).await.unwrap();
                }
            }
        });
    }

    fn client_for(stream: DuplexStream) -> BridgeClient {
        let (read_half, write_half) = tokio::io::split(stream);
        BridgeClient::connect(read_half, write_half)
    }

    #[tokio::test]
    async fn test_request_gets_correlated_result() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        serve(server_side, |req| {
            Some(JsonRpcResponse::success(
                req.id,
                serde_json::json!({ "echo": req.method }),
            ))
        });
        let client = client_for(client_side);
        let cancel = CancellationToken::new();

        let a = client.request("first", None, &cancel).await.unwrap();
        let b = client.request("second", None, &cancel).await.unwrap();
        assert_eq!(a["echo"], "first");
        assert_eq!(b["echo"], "second");
    }

    #[tokio::test]
    async fn test_rpc_error_is_reported() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        serve(server_side, |req| {
            Some(JsonRpcResponse::failure(req.id, METHOD_NOT_FOUND, "unknown"))
        });
        let client = client_for(client_side);

        let err = client
            .request("missing", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::RpcError { code, .. } if code == METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_cancellation_abandons_request() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        // Never answers
        serve(server_side, |_| None);
        let client = client_for(client_side);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client.request("slow", None, &cancel).await.unwrap_err();
        assert!(matches!(err, BridgeError::Cancelled));
        assert!(client.pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_stream_close_fails_pending() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let client = client_for(client_side);

        let closer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(server_side);
        });

        let err = client
            .request("never", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TransportClosed | BridgeError::Io(_)));
        closer.await.unwrap();

        // Later requests fail fast
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(client.is_closed());
        let err = client
            .request("after", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TransportClosed | BridgeError::Io(_)));
    }
}
