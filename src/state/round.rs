use super::GameState;

impl GameState {
    /// Every question of the current round has been asked
    pub fn is_round_complete(&self) -> bool {
        self.current_round()
            .questions()
            .all(|q| self.question_status.get(&q.id).is_some_and(|s| s.asked))
    }

    /// True when the current round is done and another one follows
    pub fn next_round_ready(&self) -> bool {
        self.is_round_complete() && self.current_round_index + 1 < self.catalog.round_count()
    }

    pub fn is_game_finished(&self) -> bool {
        self.current_round_index + 1 == self.catalog.round_count() && self.is_round_complete()
    }

    /// Move to the next round, keeping the turn on a connected player
    pub(super) fn progress_to_next_round(&mut self) {
        if self.current_round_index + 1 >= self.catalog.round_count() {
            return;
        }
        self.current_round_index += 1;
        self.turn_slot_index = self
            .find_next_connected_slot(self.turn_slot_index)
            .unwrap_or(0);
    }
}
