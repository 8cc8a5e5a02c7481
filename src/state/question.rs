use super::{score::penalty_for, GameError, GameState};
use crate::types::*;
use std::time::{Duration, Instant};

impl GameState {
    fn timer_deadline(&self, now: Instant) -> Instant {
        now + Duration::from_secs(u64::from(self.timer_seconds))
    }

    /// Open a question from the current round for the turn holder
    pub fn select_question(&mut self, question_id: &str, now: Instant) -> Result<(), GameError> {
        if self.active_question.is_some() {
            return Err(GameError::QuestionAlreadyActive);
        }

        let status = self
            .question_status
            .get(question_id)
            .ok_or(GameError::UnknownQuestion)?;
        if status.round_index != self.current_round_index {
            return Err(GameError::WrongRound);
        }
        if status.asked {
            return Err(GameError::QuestionUsed);
        }

        let (category, question) = self
            .catalog
            .find(question_id)
            .ok_or(GameError::UnknownQuestion)?;
        let turn_slot = self.resolve_turn_slot().ok_or(GameError::NoActivePlayer)?;

        let active = ActiveQuestion {
            question_id: question.id.clone(),
            category_id: category.id.clone(),
            value: question.value,
            round_index: self.current_round_index,
            status: QuestionPhase::Answering,
            responder: Some(turn_slot),
            attempted: SlotSet::new(),
            expires_at: Some(self.timer_deadline(now)),
            seconds_remaining: self.timer_seconds,
        };
        self.turn_slot_index = turn_slot;
        self.active_question = Some(active);
        Ok(())
    }

    /// Judge the current responder's answer
    pub fn mark_answer(&mut self, verdict: Verdict) -> Result<(), GameError> {
        let (slot, value) = self
            .active_question
            .as_ref()
            .and_then(|q| q.responder.map(|slot| (slot, q.value)))
            .ok_or(GameError::NoResponder)?;

        match verdict {
            Verdict::Correct => {
                self.award_points(slot, i64::from(value));
                self.finalize_question();
                Ok(())
            }
            Verdict::Incorrect => {
                self.apply_incorrect_answer(slot);
                Ok(())
            }
            Verdict::Unknown => Err(GameError::UnknownVerdict),
        }
    }

    /// Force-close the active question regardless of its status
    pub fn close_question(&mut self) -> Result<(), GameError> {
        if self.active_question.is_none() {
            return Err(GameError::NoActiveQuestion);
        }
        self.finalize_question();
        Ok(())
    }

    /// Claim the right to answer after the first responder failed
    pub fn buzz(&mut self, session_id: &str, now: Instant) -> Result<SlotIndex, GameError> {
        let attempted = match self.active_question.as_ref() {
            Some(q) if q.status == QuestionPhase::AwaitingBuzz => q.attempted,
            _ => return Err(GameError::BuzzClosed),
        };

        let slot = self
            .find_slot_by_session(session_id)
            .ok_or(GameError::NotPlayer)?;
        if attempted.contains(slot) {
            return Err(GameError::AlreadyTried);
        }
        if !self.is_connected(slot) {
            return Err(GameError::PlayerOffline);
        }

        let deadline = self.timer_deadline(now);
        let timer_seconds = self.timer_seconds;
        if let Some(active) = self.active_question.as_mut() {
            active.status = QuestionPhase::Answering;
            active.responder = Some(slot);
            active.expires_at = Some(deadline);
            active.seconds_remaining = timer_seconds;
        }
        Ok(slot)
    }

    /// Connected players who may still buzz in on the active question
    pub fn eligible_buzzers(&self) -> Vec<SlotIndex> {
        let Some(active) = self.active_question.as_ref() else {
            return Vec::new();
        };
        (0..MAX_PLAYERS)
            .filter(|slot| {
                self.is_connected(*slot)
                    && !active.attempted.contains(*slot)
                    && active.responder != Some(*slot)
            })
            .collect()
    }

    /// Penalize `slot` and either reopen the question for buzzing or close it
    /// when nobody is left to try.
    pub(super) fn apply_incorrect_answer(&mut self, slot: SlotIndex) {
        let Some(value) = self.active_question.as_ref().map(|q| q.value) else {
            return;
        };
        self.deduct_points(slot, penalty_for(value));
        if let Some(active) = self.active_question.as_mut() {
            active.attempted.insert(slot);
        }

        if self.eligible_buzzers().is_empty() {
            self.finalize_question();
            return;
        }

        let timer_seconds = self.timer_seconds;
        if let Some(active) = self.active_question.as_mut() {
            active.responder = None;
            active.status = QuestionPhase::AwaitingBuzz;
            active.expires_at = None;
            active.seconds_remaining = timer_seconds;
        }
    }

    /// Mark the active question asked, clear it and pass the turn on
    pub(super) fn finalize_question(&mut self) {
        if let Some(active) = self.active_question.take() {
            if let Some(status) = self.question_status.get_mut(&active.question_id) {
                status.asked = true;
            }
        }
        self.advance_turn();
        if self.is_round_complete() {
            self.progress_to_next_round();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::game::test_support::*;
    use super::*;

    #[test]
    fn test_select_starts_answering_for_turn_holder() {
        let mut game = game_with_players(2);
        let now = select(&mut game, "marvel-round1-100");

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::Answering);
        assert_eq!(active.responder, Some(0));
        assert!(active.attempted.is_empty());
        assert_eq!(active.seconds_remaining, DEFAULT_TIMER_SECONDS);
        assert_eq!(
            active.expires_at,
            Some(now + Duration::from_secs(u64::from(DEFAULT_TIMER_SECONDS)))
        );
        assert!(!game.question_status("marvel-round1-100").unwrap().asked);
    }

    #[test]
    fn test_select_rejections() {
        let mut game = game_with_players(1);
        let now = Instant::now();

        assert_eq!(
            game.select_question("nope", now),
            Err(GameError::UnknownQuestion)
        );
        assert_eq!(
            game.select_question("marvel-round2-200", now),
            Err(GameError::WrongRound)
        );

        game.select_question("marvel-round1-100", now).unwrap();
        assert_eq!(
            game.select_question("marvel-round1-200", now),
            Err(GameError::QuestionAlreadyActive)
        );
    }

    #[test]
    fn test_select_used_question_fails_regardless_of_turn() {
        let mut game = game_with_players(3);
        select(&mut game, "marvel-round1-100");
        game.close_question().unwrap();

        for turn in 0..3 {
            game.turn_slot_index = turn;
            assert_eq!(
                game.select_question("marvel-round1-100", Instant::now()),
                Err(GameError::QuestionUsed)
            );
        }
    }

    #[test]
    fn test_select_without_connected_player() {
        let mut game = game_with_players(1);
        game.disconnect("p0");
        assert_eq!(
            game.select_question("marvel-round1-100", Instant::now()),
            Err(GameError::NoActivePlayer)
        );
        assert!(game.active_question().is_none());
    }

    #[test]
    fn test_correct_answer_awards_and_advances_turn() {
        let mut game = game_with_players(2);
        select(&mut game, "teamups-round1-400");

        game.mark_answer(Verdict::Correct).unwrap();

        assert_eq!(game.player(0).unwrap().score, 400);
        assert!(game.active_question().is_none());
        assert!(game.question_status("teamups-round1-400").unwrap().asked);
        assert_eq!(game.turn_slot_index(), 1);
    }

    #[test]
    fn test_mark_answer_requires_responder() {
        let mut game = game_with_players(2);
        assert_eq!(
            game.mark_answer(Verdict::Correct),
            Err(GameError::NoResponder)
        );

        select(&mut game, "marvel-round1-100");
        game.mark_answer(Verdict::Incorrect).unwrap();
        assert_eq!(
            game.mark_answer(Verdict::Incorrect),
            Err(GameError::NoResponder)
        );
    }

    #[test]
    fn test_unknown_verdict_leaves_state_untouched() {
        let mut game = game_with_players(2);
        select(&mut game, "marvel-round1-100");

        assert_eq!(
            game.mark_answer(Verdict::Unknown),
            Err(GameError::UnknownVerdict)
        );
        let active = game.active_question().unwrap();
        assert_eq!(active.responder, Some(0));
        assert_eq!(game.player(0).unwrap().score, 0);
    }

    #[test]
    fn test_incorrect_reopens_then_last_failure_finalizes() {
        let mut game = game_with_players(2);
        select(&mut game, "marvel-round1-300");

        game.mark_answer(Verdict::Incorrect).unwrap();

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::AwaitingBuzz);
        assert_eq!(active.responder, None);
        assert_eq!(active.expires_at, None);
        assert_eq!(active.seconds_remaining, DEFAULT_TIMER_SECONDS);
        assert_eq!(game.player(0).unwrap().score, -150);

        game.buzz("p1", Instant::now()).unwrap();
        game.mark_answer(Verdict::Incorrect).unwrap();

        assert!(game.active_question().is_none());
        assert!(game.question_status("marvel-round1-300").unwrap().asked);
        assert_eq!(game.player(1).unwrap().score, -150);
    }

    #[test]
    fn test_odd_value_penalty_rounds_down() {
        let raw = r#"{"rounds":[{"id":"r","title":"R","categories":[
            {"id":"odd","title":"Odd","questions":[{"value":101,"prompt":"p","answer":"a"}]}
        ]}]}"#;
        let catalog = std::sync::Arc::new(crate::catalog::Catalog::from_json(raw).unwrap());
        let mut game = GameState::new(catalog, DEFAULT_TIMER_SECONDS);
        game.join("p0", Role::Player, None).unwrap();
        game.join("p1", Role::Player, None).unwrap();
        select(&mut game, "odd-r-101");

        game.mark_answer(Verdict::Incorrect).unwrap();

        assert_eq!(game.player(0).unwrap().score, -50);
    }

    #[test]
    fn test_single_player_incorrect_finalizes_immediately() {
        let mut game = game_with_players(1);
        select(&mut game, "marvel-round1-100");

        game.mark_answer(Verdict::Incorrect).unwrap();

        assert!(game.active_question().is_none());
        assert!(game.question_status("marvel-round1-100").unwrap().asked);
        assert_eq!(game.player(0).unwrap().score, -50);
    }

    #[test]
    fn test_buzz_rejections() {
        let mut game = game_with_players(3);
        assert_eq!(
            game.buzz("p1", Instant::now()),
            Err(GameError::BuzzClosed)
        );

        select(&mut game, "marvel-round1-100");
        assert_eq!(
            game.buzz("p1", Instant::now()),
            Err(GameError::BuzzClosed)
        );

        game.mark_answer(Verdict::Incorrect).unwrap();
        assert_eq!(
            game.buzz("ghost", Instant::now()),
            Err(GameError::NotPlayer)
        );
        assert_eq!(
            game.buzz("p0", Instant::now()),
            Err(GameError::AlreadyTried)
        );

        game.player_slots[2].as_mut().unwrap().connected = false;
        assert_eq!(
            game.buzz("p2", Instant::now()),
            Err(GameError::PlayerOffline)
        );
    }

    #[test]
    fn test_buzz_restarts_timer_for_new_responder() {
        let mut game = game_with_players(2);
        select(&mut game, "marvel-round1-100");
        game.mark_answer(Verdict::Incorrect).unwrap();

        let now = Instant::now();
        assert_eq!(game.buzz("p1", now), Ok(1));

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::Answering);
        assert_eq!(active.responder, Some(1));
        assert!(!active.attempted.contains(1));
        assert!(active.expires_at.is_some_and(|t| t > now));
    }

    #[test]
    fn test_close_question() {
        let mut game = game_with_players(2);
        assert_eq!(game.close_question(), Err(GameError::NoActiveQuestion));

        select(&mut game, "marvel-round1-500");
        game.mark_answer(Verdict::Incorrect).unwrap();
        game.close_question().unwrap();

        assert!(game.active_question().is_none());
        assert!(game.question_status("marvel-round1-500").unwrap().asked);
        assert_eq!(game.turn_slot_index(), 1);
    }
}
