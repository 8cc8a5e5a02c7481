//! Join and player message handlers

use crate::protocol::ServerMessage;
use crate::sessions::{ConnectionId, Identity};
use crate::state::{AppState, GameError};
use crate::types::*;
use std::sync::Arc;
use std::time::Instant;

/// Claim a role for this connection. Clients without a stored session id
/// get a fresh one.
pub async fn handle_join(
    state: &Arc<AppState>,
    conn: ConnectionId,
    role: Option<Role>,
    name: Option<String>,
    session_id: Option<SessionId>,
) -> Option<ServerMessage> {
    let session_id = session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ulid::Ulid::new().to_string());
    let role = role.unwrap_or(Role::Player);

    let mut game = state.game.lock().await;
    let outcome = match game.join(&session_id, role, name.as_deref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Join rejected for {}: {}", session_id, e);
            return Some(e.into());
        }
    };

    let mut sessions = state.sessions.write().await;
    if let Some(old) = sessions.bind(conn, &outcome.session_id, outcome.role) {
        tracing::info!(
            "Session {} moved from connection {} to {}",
            outcome.session_id,
            old,
            conn
        );
    }
    tracing::info!(
        "{:?} joined: session={}, slot={:?}, name={}",
        outcome.role,
        outcome.session_id,
        outcome.slot_index,
        outcome.name
    );

    if let Some(tx) = sessions.sender(conn) {
        let _ = tx.send(ServerMessage::Joined {
            session_id: outcome.session_id,
            role: outcome.role,
            slot_index: outcome.slot_index,
            name: outcome.name,
        });
    }
    drop(sessions);
    state.commit(&game).await;
    None
}

pub async fn handle_buzzer(
    state: &Arc<AppState>,
    identity: Option<Identity>,
) -> Option<ServerMessage> {
    let Some(identity) = identity.filter(|i| i.role == Role::Player) else {
        return Some(GameError::NotPlayer.into());
    };

    let mut game = state.game.lock().await;
    match game.buzz(&identity.session_id, Instant::now()) {
        Ok(slot) => {
            tracing::info!("Slot {} buzzed in", slot);
            state.broadcast_locked(&game).await;
            None
        }
        Err(e) => Some(e.into()),
    }
}
