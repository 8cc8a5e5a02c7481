//! Admin-only command handlers
//!
//! All handlers in this module require the admin role.
//! Authorization is checked in the main dispatch layer before calling these.

use crate::protocol::ServerMessage;
use crate::state::{AppState, GameError};
use crate::types::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub async fn handle_select_question(
    state: &Arc<AppState>,
    question_id: QuestionId,
) -> Option<ServerMessage> {
    tracing::info!("Admin selecting question {}", question_id);
    let mut game = state.game.lock().await;
    if let Err(e) = game.select_question(&question_id, Instant::now()) {
        return Some(e.into());
    }
    state.commit(&game).await;
    None
}

/// Anything other than `correct` or `incorrect` is an unknown verdict
pub async fn handle_mark_answer(state: &Arc<AppState>, verdict: Value) -> Option<ServerMessage> {
    let verdict = serde_json::from_value(verdict).unwrap_or(Verdict::Unknown);
    tracing::info!("Admin marked answer {:?}", verdict);
    let mut game = state.game.lock().await;
    if let Err(e) = game.mark_answer(verdict) {
        return Some(e.into());
    }
    state.commit(&game).await;
    None
}

/// Closing with nothing active is not reported back
pub async fn handle_close_question(state: &Arc<AppState>) -> Option<ServerMessage> {
    let mut game = state.game.lock().await;
    match game.close_question() {
        Ok(()) => tracing::info!("Admin closed the active question"),
        Err(e) => tracing::debug!("Close question ignored: {}", e),
    }
    state.commit(&game).await;
    None
}

pub async fn handle_reset(state: &Arc<AppState>, drop_players: bool) -> Option<ServerMessage> {
    tracing::info!("Admin reset the game (drop players: {})", drop_players);
    let mut game = state.game.lock().await;
    let removed = game.reset(drop_players);
    state
        .disconnect_sessions(&mut game, &removed, KickReason::Reset)
        .await;
    state.commit(&game).await;
    None
}

pub async fn handle_kick_player(state: &Arc<AppState>, slot_index: Value) -> Option<ServerMessage> {
    tracing::info!("Admin kicking slot {}", slot_index);
    let mut game = state.game.lock().await;
    let result = slot_from_value(&slot_index).and_then(|slot| game.remove_player(slot));
    let removed = match result {
        Ok(session_id) => session_id,
        Err(e) => return Some(e.into()),
    };
    state
        .disconnect_sessions(&mut game, &[removed], KickReason::Kicked)
        .await;
    state.commit(&game).await;
    None
}

/// Slot indices arrive untyped; only non-negative integers can name a slot
fn slot_from_value(value: &Value) -> Result<SlotIndex, GameError> {
    value
        .as_u64()
        .and_then(|n| SlotIndex::try_from(n).ok())
        .ok_or(GameError::InvalidSlot)
}
