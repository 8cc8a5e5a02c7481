use crate::catalog::{Catalog, Round};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Authoritative game state.
///
/// All mutation goes through the operations defined on this type across the
/// `state` submodules. Operations are synchronous and never perform I/O; on
/// failure they leave the state untouched.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(super) catalog: Arc<Catalog>,
    pub(super) timer_seconds: u32,
    pub(super) admin: AdminProfile,
    pub(super) player_slots: [Option<PlayerSlot>; MAX_PLAYERS],
    pub(super) question_status: HashMap<QuestionId, QuestionStatus>,
    pub(super) current_round_index: usize,
    pub(super) turn_slot_index: SlotIndex,
    pub(super) active_question: Option<ActiveQuestion>,
}

pub(super) fn fresh_question_status(catalog: &Catalog) -> HashMap<QuestionId, QuestionStatus> {
    let mut status = HashMap::new();
    for round in catalog.rounds() {
        for category in &round.categories {
            for question in &category.questions {
                status.insert(
                    question.id.clone(),
                    QuestionStatus {
                        asked: false,
                        round_index: round.index,
                        category_id: category.id.clone(),
                    },
                );
            }
        }
    }
    status
}

impl GameState {
    pub fn new(catalog: Arc<Catalog>, timer_seconds: u32) -> Self {
        let question_status = fresh_question_status(&catalog);
        Self {
            catalog,
            timer_seconds,
            admin: AdminProfile::default(),
            player_slots: Default::default(),
            question_status,
            current_round_index: 0,
            turn_slot_index: 0,
            active_question: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timer_seconds(&self) -> u32 {
        self.timer_seconds
    }

    pub fn admin(&self) -> &AdminProfile {
        &self.admin
    }

    pub fn player_slots(&self) -> &[Option<PlayerSlot>] {
        &self.player_slots
    }

    pub fn player(&self, slot: SlotIndex) -> Option<&PlayerSlot> {
        self.player_slots.get(slot).and_then(|p| p.as_ref())
    }

    pub fn question_status(&self, id: &str) -> Option<&QuestionStatus> {
        self.question_status.get(id)
    }

    pub fn current_round_index(&self) -> usize {
        self.current_round_index
    }

    pub fn current_round(&self) -> &Round {
        &self.catalog.rounds()[self.current_round_index]
    }

    pub fn turn_slot_index(&self) -> SlotIndex {
        self.turn_slot_index
    }

    pub fn active_question(&self) -> Option<&ActiveQuestion> {
        self.active_question.as_ref()
    }

    /// Start over with a fresh board.
    ///
    /// With `drop_players` every slot is emptied and the former session ids
    /// are returned so the caller can disconnect them. Otherwise identities
    /// are kept and only scores are zeroed.
    pub fn reset(&mut self, drop_players: bool) -> Vec<SessionId> {
        self.question_status = fresh_question_status(&self.catalog);
        self.current_round_index = 0;
        self.turn_slot_index = 0;
        self.active_question = None;

        let mut removed = Vec::new();
        if drop_players {
            for slot in self.player_slots.iter_mut() {
                if let Some(player) = slot.take() {
                    removed.push(player.id);
                }
            }
        } else {
            for player in self.player_slots.iter_mut().flatten() {
                player.score = 0;
            }
        }

        self.ensure_turn_valid();
        removed
    }

    pub(super) fn find_slot_by_session(&self, session_id: &str) -> Option<SlotIndex> {
        self.player_slots
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.id == session_id))
    }

    pub(super) fn is_connected(&self, slot: SlotIndex) -> bool {
        self.player(slot).is_some_and(|p| p.connected)
    }

    /// First connected slot at or after `start`, wrapping around
    pub(super) fn find_next_connected_slot(&self, start: SlotIndex) -> Option<SlotIndex> {
        (0..MAX_PLAYERS)
            .map(|offset| (start + offset) % MAX_PLAYERS)
            .find(|idx| self.is_connected(*idx))
    }

    /// Slot that would hold the turn after re-validation, without mutating
    pub(super) fn resolve_turn_slot(&self) -> Option<SlotIndex> {
        if self.is_connected(self.turn_slot_index) {
            Some(self.turn_slot_index)
        } else {
            self.find_next_connected_slot(self.turn_slot_index)
        }
    }

    /// Move the turn pointer off a disconnected or empty slot if possible
    pub(super) fn ensure_turn_valid(&mut self) {
        if let Some(slot) = self.resolve_turn_slot() {
            self.turn_slot_index = slot;
        }
    }

    pub(super) fn advance_turn(&mut self) {
        if let Some(next) = self.find_next_connected_slot(self.turn_slot_index + 1) {
            self.turn_slot_index = next;
        }
    }
}
