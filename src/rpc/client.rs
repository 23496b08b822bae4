use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::debug;

use super::protocol::{RpcRequest, RpcResponse};
use crate::error::DaemonError;

/// Call a parameterless method on the daemon listening at `addr` (host:port).
pub async fn call(addr: &str, method: &str) -> Result<Value, DaemonError> {
    let url = format!("ws://{}", addr);
    let (mut ws_stream, _) = connect_async(url.as_str()).await?;

    let request = RpcRequest::new(method, 1);
    ws_stream
        .send(Message::Text(serde_json::to_string(&request)?))
        .await?;

    while let Some(msg) = ws_stream.next().await {
        match msg? {
            Message::Text(text) => {
                let response: RpcResponse = serde_json::from_str(&text)?;
                if response.id != Value::from(1) {
                    debug!(id = %response.id, "Ignoring reply for another request");
                    continue;
                }
                let _ = ws_stream.close(None).await;
                if let Some(error) = response.error {
                    return Err(DaemonError::RpcFailure {
                        code: error.code,
                        message: error.message,
                    });
                }
                return Ok(response.result.unwrap_or(Value::Null));
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    Err(DaemonError::NoReply)
}
