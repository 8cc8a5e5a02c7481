mod error;
mod game;
mod player;
mod question;
mod round;
mod score;
mod snapshot;
mod timer;
mod view;

pub use error::GameError;
pub use game::GameState;
pub use player::JoinOutcome;
pub use score::penalty_for;
pub use snapshot::{RestoreReport, Snapshot, SnapshotAdmin, SnapshotPlayer, SnapshotQuestion};
pub use timer::TickOutcome;
pub use view::{
    ActiveQuestionView, AdminView, BoardQuestionView, CategoryView, GameView, PlayerView,
};

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::persistence::Persistence;
use crate::protocol::ServerMessage;
use crate::sessions::{ConnectionId, SessionRegistry};
use crate::types::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
///
/// Lock order is `game` then `sessions`. Every event holds the game guard
/// from its mutation through the fan-out, so events apply one at a time and
/// clients see views in the order they were built.
pub struct AppState {
    pub config: AppConfig,
    pub game: Mutex<GameState>,
    pub sessions: RwLock<SessionRegistry>,
    persistence: Option<Arc<Persistence>>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, config: AppConfig) -> Self {
        let game = GameState::new(catalog, config.timer_seconds);
        Self {
            config,
            game: Mutex::new(game),
            sessions: RwLock::new(SessionRegistry::new()),
            persistence: None,
        }
    }

    pub fn with_persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = Some(Arc::new(persistence));
        self
    }

    /// Load the last snapshot, if any. Failures are logged and the game
    /// starts fresh.
    pub async fn restore(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let snapshot = match persistence.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(
                    "Failed to load snapshot from {}: {}",
                    persistence.path().display(),
                    e
                );
                return;
            }
        };

        let report = self.game.lock().await.apply_snapshot(snapshot);
        if report.is_clean() {
            tracing::info!("Restored game from {}", persistence.path().display());
            return;
        }
        if !report.unknown_questions.is_empty() {
            tracing::warn!(
                "Snapshot references {} unknown questions, ignored",
                report.unknown_questions.len()
            );
        }
        if let Some(index) = report.invalid_round_index {
            tracing::warn!("Snapshot round index {} out of range, ignored", index);
        }
        if let Some(index) = report.invalid_turn_index {
            tracing::warn!("Snapshot turn index {} out of range, ignored", index);
        }
        tracing::info!(
            "Restored game from {} with warnings",
            persistence.path().display()
        );
    }

    /// Queue a debounced save of the current game
    pub fn schedule_save(self: &Arc<Self>) {
        let Some(persistence) = self.persistence.clone() else {
            return;
        };
        if !persistence.begin_window() {
            return;
        }

        let state = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(persistence.debounce()).await;
            persistence.end_window();
            let snapshot = state.game.lock().await.snapshot();
            if let Err(e) = persistence.save(snapshot).await {
                tracing::error!("Failed to save snapshot: {}", e);
            }
        });
    }

    /// Send every joined connection the view for its role. The caller keeps
    /// holding the game guard until the views are queued.
    pub async fn broadcast_locked(&self, game: &GameState) {
        let sessions = self.sessions.read().await;
        fan_out(game, &sessions);
    }

    /// Persist and broadcast after a state change
    pub async fn commit(self: &Arc<Self>, game: &GameState) {
        self.schedule_save();
        self.broadcast_locked(game).await;
    }

    /// Notify and detach the given sessions, then mark them disconnected.
    /// Sessions that are already gone are skipped silently.
    pub async fn disconnect_sessions(
        &self,
        game: &mut GameState,
        session_ids: &[SessionId],
        reason: KickReason,
    ) {
        let mut sessions = self.sessions.write().await;
        for session_id in session_ids {
            if let Some(tx) = sessions.evict_session(session_id) {
                tracing::info!("Disconnecting session {} ({:?})", session_id, reason);
                let _ = tx.send(ServerMessage::Kicked { reason });
            }
            game.disconnect(session_id);
        }
    }

    /// Handle a closed socket. Only the connection that still owns a session
    /// may mark it disconnected.
    pub async fn connection_closed(self: &Arc<Self>, conn: ConnectionId) {
        let mut game = self.game.lock().await;
        let identity = self.sessions.write().await.unregister(conn);
        if let Some(identity) = identity {
            tracing::info!(
                "Session {} ({:?}) disconnected",
                identity.session_id,
                identity.role
            );
            game.disconnect(&identity.session_id);
            self.commit(&game).await;
        }
    }

    /// One timer driver step
    pub async fn tick(self: &Arc<Self>) -> TickOutcome {
        let mut game = self.game.lock().await;
        let outcome = game.tick_timer(Instant::now());
        if outcome.changed {
            if outcome.needs_persist {
                self.schedule_save();
            }
            self.broadcast_locked(&game).await;
        }
        outcome
    }
}

fn fan_out(game: &GameState, sessions: &SessionRegistry) {
    let admin_view = game.view(true);
    let player_view = game.view(false);
    for (role, tx) in sessions.viewers() {
        let view = match role {
            Role::Admin => admin_view.clone(),
            Role::Player => player_view.clone(),
        };
        // A closed queue means the connection is going away
        let _ = tx.send(ServerMessage::state(view));
    }
}
