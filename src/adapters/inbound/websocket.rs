//! WebSocket transport for driver clients.

use crate::domains::presence::{Connection, PresenceCoordinator, SessionHandle};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use super::gateway::GatewayState;

/// WebSocket upgrade handler for /ws.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.coordinator))
}

/// Drive one client connection until the socket closes.
///
/// Inbound frames are handled one at a time, in arrival order. Outbound events
/// (replies and alerts from other connections) are written by a separate task
/// so a slow client never stalls whoever is alerting it.
pub async fn handle_socket(socket: WebSocket, coordinator: Arc<PresenceCoordinator>) {
    let (mut sink, mut stream) = socket.split();
    let (session, mut outbound) = SessionHandle::channel();
    let connection_id = session.connection_id();
    tracing::debug!(%connection_id, "client connected");

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(%connection_id, "failed to encode {}: {}", event.event_name(), e);
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut connection = Connection::new(coordinator, session);
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => connection.handle_frame(&text).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%connection_id, "socket error: {}", e);
                break;
            }
        }
    }

    connection.disconnect().await;
    // The registry may still hold clones of this session's sender, so the
    // writer is stopped explicitly.
    writer.abort();
    tracing::debug!(%connection_id, "client disconnected");
}
