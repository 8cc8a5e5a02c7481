use super::GameState;
use crate::types::*;

/// Points lost for a wrong answer on a question worth `value`
pub fn penalty_for(value: u32) -> i64 {
    (f64::from(value) * PENALTY_FACTOR).floor() as i64
}

impl GameState {
    pub(super) fn award_points(&mut self, slot: SlotIndex, points: i64) {
        if let Some(player) = self.player_slots.get_mut(slot).and_then(|p| p.as_mut()) {
            player.score += points;
        }
    }

    /// Scores may go negative
    pub(super) fn deduct_points(&mut self, slot: SlotIndex, points: i64) {
        self.award_points(slot, -points);
    }
}

#[cfg(test)]
mod tests {
    use super::super::game::test_support::*;
    use super::*;

    #[test]
    fn test_penalty_is_half_rounded_down() {
        assert_eq!(penalty_for(300), 150);
        assert_eq!(penalty_for(101), 50);
        assert_eq!(penalty_for(1), 0);
        assert_eq!(penalty_for(1000), 500);
    }

    #[test]
    fn test_deduct_goes_negative() {
        let mut game = game_with_players(1);
        game.deduct_points(0, 250);
        assert_eq!(game.player(0).unwrap().score, -250);
    }

    #[test]
    fn test_points_for_empty_slot_are_ignored() {
        let mut game = game_with_players(1);
        game.award_points(3, 100);
        assert!(game.player(3).is_none());
    }
}
