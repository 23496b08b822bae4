use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use super::registry::RpcRegistry;
use crate::error::DaemonError;

/// Bind the RPC listener. `host` may be a name or an IP literal. Failing
/// here is fatal, so it happens before the poll loop starts.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, DaemonError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| DaemonError::Bind {
            addr: format!("{}:{}", host, port),
            source,
        })
}

pub async fn serve(listener: TcpListener, registry: Arc<RpcRegistry>) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, methods = ?registry.methods(), "RPC server listening");
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                debug!(%peer_addr, "New RPC connection");
                tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(&registry)));
            }
            Err(e) => warn!("Failed to accept RPC connection: {}", e),
        }
    }
}

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, registry: Arc<RpcRegistry>) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer_addr, "WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let Some(response) = registry.handle_text(&text) else {
                    continue;
                };
                let response_json = match serde_json::to_string(&response) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode RPC response: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(Message::Text(response_json)).await {
                    warn!(%peer_addr, "Failed to send RPC response: {}", e);
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!(%peer_addr, "RPC connection closed by peer");
                break;
            }
            Ok(Message::Ping(data)) => {
                if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                    warn!(%peer_addr, "Failed to send pong: {}", e);
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(%peer_addr, "WebSocket error: {}", e);
                break;
            }
        }
    }

    debug!(%peer_addr, "RPC connection terminated");
}
