pub mod admin;
pub mod handlers;
pub mod player;
pub mod signal;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerMessage, INVALID_PAYLOAD};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (conn, open) = {
        let mut sessions = state.sessions.write().await;
        (sessions.register(tx.clone()), sessions.connection_count())
    };
    tracing::info!("WebSocket connected: conn={}, open={}", conn, open);

    // Dedicated writer so broadcasts never wait on this socket
    let mut writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            if matches!(msg, ServerMessage::Kicked { .. }) {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut writer => break,

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handlers::handle_message(client_msg, conn, &state).await
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                Some(ServerMessage::error(INVALID_PAYLOAD))
                            }
                        };
                        if let Some(reply) = reply {
                            let _ = tx.send(reply);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    state.connection_closed(conn).await;
    writer.abort();
    let open = state.sessions.read().await.connection_count();
    tracing::info!("WebSocket connection closed: conn={}, open={}", conn, open);
}
