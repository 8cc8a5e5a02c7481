//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Authorization is checked here, then dispatched to role-specific handler modules.

use crate::protocol::{ClientMessage, ServerMessage, ADMIN_REQUIRED, UNKNOWN_EVENT};
use crate::sessions::ConnectionId;
use crate::state::AppState;
use crate::types::Role;
use std::sync::Arc;

use super::{admin, player, signal};

/// Handle a client message from connection `conn` and return an optional
/// direct reply. State changes are broadcast by the handlers themselves.
pub async fn handle_message(
    msg: ClientMessage,
    conn: ConnectionId,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let identity = state.sessions.read().await.identity(conn).cloned();

    if msg.requires_admin() && identity.as_ref().map(|i| i.role) != Some(Role::Admin) {
        tracing::debug!("Rejected admin command from connection {}", conn);
        return Some(ServerMessage::error(ADMIN_REQUIRED));
    }

    match msg {
        ClientMessage::Join {
            role,
            name,
            session_id,
        } => player::handle_join(state, conn, role, name, session_id).await,

        ClientMessage::Buzzer {} => player::handle_buzzer(state, identity).await,

        ClientMessage::SignalRelay {
            target_session_id,
            payload,
        } => signal::handle_relay(state, identity, target_session_id, payload).await,

        // Admin-only commands, checked above
        ClientMessage::SelectQuestion { question_id } => {
            admin::handle_select_question(state, question_id).await
        }
        ClientMessage::MarkAnswer { verdict } => admin::handle_mark_answer(state, verdict).await,
        ClientMessage::CloseQuestion {} => admin::handle_close_question(state).await,
        ClientMessage::Reset { drop_players } => admin::handle_reset(state, drop_players).await,
        ClientMessage::KickPlayer { slot_index } => {
            admin::handle_kick_player(state, slot_index).await
        }

        ClientMessage::Unknown => Some(ServerMessage::error(UNKNOWN_EVENT)),
    }
}
