//! Peer signaling relay
//!
//! Payloads are forwarded untouched between two joined sessions.

use crate::protocol::{ServerMessage, NOT_JOINED};
use crate::sessions::Identity;
use crate::state::AppState;
use crate::types::SessionId;
use std::sync::Arc;

pub async fn handle_relay(
    state: &Arc<AppState>,
    identity: Option<Identity>,
    target_session_id: SessionId,
    payload: serde_json::Value,
) -> Option<ServerMessage> {
    let Some(identity) = identity else {
        return Some(ServerMessage::error(NOT_JOINED));
    };

    let sessions = state.sessions.read().await;
    match sessions.sender_for_session(&target_session_id) {
        Some(tx) => {
            let _ = tx.send(ServerMessage::Signal {
                from_session_id: identity.session_id,
                payload,
            });
        }
        None => tracing::debug!("Dropping signal for unknown session {}", target_session_id),
    }
    None
}
