//! Transport layer for tool server communication.
//!
//! Frames are `Content-Length: N\r\n\r\n` followed by `N` bytes of JSON, in
//! both directions. Other headers are tolerated and ignored.
//!
//! - [`read_frame`] / [`write_frame`]: one frame at a time over any tokio stream
//! - [`classify_message`]: pure function inspecting `id` / `method`

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{BridgeError, Result};

/// Upper bound on a single frame body
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response { id: u64 },
    /// A request initiated by the server (has `id` + `method`).
    IncomingRequest { id: u64 },
    /// A notification (has `method`, no `id`) or anything unrecognised.
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let id = json.get("id").and_then(|v| v.as_u64());
    let method = json.get("method").and_then(|v| v.as_str());

    match (id, method) {
        (Some(id), Some(_)) => MessageKind::IncomingRequest { id },
        (Some(id), None) => MessageKind::Response { id },
        _ => MessageKind::Notification,
    }
}

/// Write one framed message and flush.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message.
///
/// Returns `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = String::new();
    let mut content_length: Option<usize> = None;

    let length = loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return match content_length {
                None => Ok(None),
                Some(_) => Err(BridgeError::TransportClosed),
            };
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            // Blank line ends the header block once a length was seen
            match content_length {
                Some(len) => break len,
                None => continue,
            }
        }

        if let Some(value) = trimmed.strip_prefix("Content-Length:") {
            let len = value
                .trim()
                .parse::<usize>()
                .map_err(|_| BridgeError::InvalidFrame(format!("bad length '{}'", value.trim())))?;
            content_length = Some(len);
        }
    };

    if length > MAX_FRAME_BYTES {
        return Err(BridgeError::InvalidFrame(format!(
            "frame of {} bytes exceeds limit of {}",
            length, MAX_FRAME_BYTES
        )));
    }

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}
