use super::{GameError, GameState};
use crate::types::*;

/// Result of a successful join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub session_id: SessionId,
    pub role: Role,
    pub slot_index: Option<SlotIndex>,
    pub name: String,
}

fn clean_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

impl GameState {
    /// Claim the admin role or a player slot for `session_id`.
    ///
    /// A player session that already owns a slot is reconnected to it.
    pub fn join(
        &mut self,
        session_id: &str,
        role: Role,
        name: Option<&str>,
    ) -> Result<JoinOutcome, GameError> {
        if session_id.is_empty() {
            return Err(GameError::MissingSession);
        }
        let name = clean_name(name);

        if role == Role::Admin {
            if self.admin.connected
                && self
                    .admin
                    .id
                    .as_deref()
                    .is_some_and(|id| id != session_id)
            {
                return Err(GameError::AdminExists);
            }
            self.admin.id = Some(session_id.to_string());
            self.admin.connected = true;
            if let Some(name) = name {
                self.admin.name = name;
            }
            return Ok(JoinOutcome {
                session_id: session_id.to_string(),
                role,
                slot_index: None,
                name: self.admin.name.clone(),
            });
        }

        let slot = match self.find_slot_by_session(session_id) {
            Some(slot) => {
                if let Some(player) = self.player_slots[slot].as_mut() {
                    if let Some(name) = name {
                        player.name = name;
                    }
                    player.connected = true;
                }
                slot
            }
            None => {
                let slot = self
                    .player_slots
                    .iter()
                    .position(Option::is_none)
                    .ok_or(GameError::PlayersFull)?;
                self.player_slots[slot] = Some(PlayerSlot {
                    id: session_id.to_string(),
                    slot_index: slot,
                    name: name.unwrap_or_else(|| format!("Player {}", slot + 1)),
                    score: 0,
                    connected: true,
                });
                slot
            }
        };

        self.ensure_turn_valid();

        let player_name = self
            .player(slot)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        Ok(JoinOutcome {
            session_id: session_id.to_string(),
            role,
            slot_index: Some(slot),
            name: player_name,
        })
    }

    /// Mark a session as disconnected, keeping its seat.
    ///
    /// A responder who drops out is treated as having answered incorrectly.
    /// Returns whether the session was known.
    pub fn disconnect(&mut self, session_id: &str) -> bool {
        let mut known = false;

        if self.admin.id.as_deref() == Some(session_id) {
            self.admin.connected = false;
            known = true;
        }

        if let Some(slot) = self.find_slot_by_session(session_id) {
            if let Some(player) = self.player_slots[slot].as_mut() {
                player.connected = false;
            }
            known = true;

            let responding = self
                .active_question
                .as_ref()
                .is_some_and(|q| q.responder == Some(slot));
            if responding {
                self.apply_incorrect_answer(slot);
            }
        }

        self.ensure_turn_valid();
        known
    }

    /// Kick the player in `slot`, returning their session id
    pub fn remove_player(&mut self, slot: SlotIndex) -> Result<SessionId, GameError> {
        if slot >= MAX_PLAYERS {
            return Err(GameError::InvalidSlot);
        }
        let removed = self
            .player(slot)
            .map(|p| p.id.clone())
            .ok_or(GameError::SlotEmpty)?;

        if self.active_question.is_some() {
            // Only reachable while answering; awaiting_buzz has no responder
            let responding = self
                .active_question
                .as_ref()
                .is_some_and(|q| q.responder == Some(slot));
            if responding {
                self.apply_incorrect_answer(slot);
            }

            let awaiting = match self.active_question.as_mut() {
                Some(active) => {
                    active.attempted.insert(slot);
                    active.status == QuestionPhase::AwaitingBuzz
                }
                None => false,
            };
            if awaiting && self.eligible_buzzers().is_empty() {
                self.finalize_question();
            }
        }

        self.player_slots[slot] = None;
        if self.turn_slot_index == slot {
            self.advance_turn();
        }
        self.ensure_turn_valid();

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::game::test_support::*;
    use super::*;

    #[test]
    fn test_join_allocates_slots_in_order() {
        let mut game = new_game();
        let first = game.join("a", Role::Player, Some("Alice")).unwrap();
        let second = game.join("b", Role::Player, None).unwrap();

        assert_eq!(first.slot_index, Some(0));
        assert_eq!(first.name, "Alice");
        assert_eq!(second.slot_index, Some(1));
        assert_eq!(second.name, "Player 2");
        assert_eq!(game.player(1).unwrap().score, 0);
    }

    #[test]
    fn test_fifth_player_is_rejected() {
        let mut game = game_with_players(4);
        let result = game.join("p4", Role::Player, None);
        assert_eq!(result, Err(GameError::PlayersFull));
        assert!(game.find_slot_by_session("p4").is_none());
    }

    #[test]
    fn test_missing_session_rejected() {
        let mut game = new_game();
        assert_eq!(
            game.join("", Role::Player, None),
            Err(GameError::MissingSession)
        );
    }

    #[test]
    fn test_reconnect_keeps_slot_and_score() {
        let mut game = game_with_players(2);
        game.player_slots[1].as_mut().unwrap().score = 250;
        game.disconnect("p1");
        assert!(!game.player(1).unwrap().connected);

        let outcome = game.join("p1", Role::Player, Some("Bob")).unwrap();

        assert_eq!(outcome.slot_index, Some(1));
        let player = game.player(1).unwrap();
        assert!(player.connected);
        assert_eq!(player.score, 250);
        assert_eq!(player.name, "Bob");
    }

    #[test]
    fn test_reconnect_without_name_keeps_name() {
        let mut game = new_game();
        game.join("a", Role::Player, Some("Alice")).unwrap();
        game.disconnect("a");
        let outcome = game.join("a", Role::Player, Some("  ")).unwrap();
        assert_eq!(outcome.name, "Alice");
    }

    #[test]
    fn test_second_admin_rejected_while_first_connected() {
        let mut game = new_game();
        game.join("admin-1", Role::Admin, Some("Quizmaster")).unwrap();

        assert_eq!(
            game.join("admin-2", Role::Admin, None),
            Err(GameError::AdminExists)
        );

        let again = game.join("admin-1", Role::Admin, None).unwrap();
        assert_eq!(again.name, "Quizmaster");
        assert_eq!(again.slot_index, None);
    }

    #[test]
    fn test_admin_can_be_taken_over_after_disconnect() {
        let mut game = new_game();
        game.join("admin-1", Role::Admin, None).unwrap();
        assert!(game.disconnect("admin-1"));
        assert_eq!(game.admin().id.as_deref(), Some("admin-1"));

        game.join("admin-2", Role::Admin, None).unwrap();
        assert_eq!(game.admin().id.as_deref(), Some("admin-2"));
        assert!(game.admin().connected);
    }

    #[test]
    fn test_disconnect_unknown_session_is_noop() {
        let mut game = game_with_players(1);
        assert!(!game.disconnect("ghost"));
        assert!(game.player(0).unwrap().connected);
    }

    #[test]
    fn test_disconnect_moves_turn() {
        let mut game = game_with_players(3);
        assert_eq!(game.turn_slot_index(), 0);
        game.disconnect("p0");
        assert_eq!(game.turn_slot_index(), 1);
    }

    #[test]
    fn test_responder_disconnect_reopens_buzzing() {
        let mut game = game_with_players(2);
        select(&mut game, "marvel-round1-300");

        game.disconnect("p0");

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::AwaitingBuzz);
        assert_eq!(active.responder, None);
        assert_eq!(game.player(0).unwrap().score, -150);
    }

    #[test]
    fn test_remove_player_validates_slot() {
        let mut game = game_with_players(1);
        assert_eq!(game.remove_player(4), Err(GameError::InvalidSlot));
        assert_eq!(game.remove_player(2), Err(GameError::SlotEmpty));
    }

    #[test]
    fn test_remove_turn_holder_advances_turn() {
        let mut game = game_with_players(3);

        let removed = game.remove_player(0).unwrap();

        assert_eq!(removed, "p0");
        assert!(game.player(0).is_none());
        assert_eq!(game.turn_slot_index(), 1);
    }

    #[test]
    fn test_remove_responder_applies_penalty_first() {
        let mut game = game_with_players(3);
        select(&mut game, "marvel-round1-200");

        game.remove_player(0).unwrap();

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::AwaitingBuzz);
        assert!(active.attempted.contains(0));
        assert_eq!(game.eligible_buzzers(), vec![1, 2]);
    }

    #[test]
    fn test_remove_last_eligible_buzzer_finalizes() {
        let mut game = game_with_players(2);
        select(&mut game, "marvel-round1-100");
        game.mark_answer(Verdict::Incorrect).unwrap();
        assert_eq!(game.eligible_buzzers(), vec![1]);

        game.remove_player(1).unwrap();

        assert!(game.active_question().is_none());
        assert!(game.question_status("marvel-round1-100").unwrap().asked);
    }
}
