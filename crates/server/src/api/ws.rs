//! WebSocket streaming of game events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use ticketrush_core::GameEventEnvelope;

use super::error::ApiError;
use super::extract::ApiPath;
use super::sessions::find_session;
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket upgrade handler.
///
/// The subscription is taken before the upgrade so no event published in
/// between is missed. Only the receiver moves into the socket task, so the
/// stream ends when the session is deleted.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let session = find_session(&state, &id).await?;
    let rx = session.subscribe();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, rx)))
}

/// Handle a single WebSocket connection.
async fn handle_socket(
    socket: WebSocket,
    session_id: String,
    mut rx: broadcast::Receiver<GameEventEnvelope>,
) {
    let (mut sender, mut receiver) = socket.split();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!(session_id = %session_id, "WebSocket client connected");

    // Forward game events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    WS_MESSAGES_SENT
                        .with_label_values(&[envelope.event.kind()])
                        .inc();

                    match serde_json::to_string(&envelope) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize game event: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} events", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Session gone, closing WebSocket");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            result = receiver.next() => match result {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("WebSocket client requested close");
                    break;
                }
                Some(Ok(Message::Text(text))) => {
                    // The game is driven over HTTP; log and ignore
                    debug!("Received text message: {}", text.as_str());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!(session_id = %session_id, "WebSocket client disconnected");
}
