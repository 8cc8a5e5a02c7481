use super::GameState;
use crate::types::*;
use std::time::Instant;

/// What a timer tick did to the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Clients should receive a fresh view
    pub changed: bool,
    /// Durable state moved and a save should be scheduled
    pub needs_persist: bool,
}

fn seconds_until(expires_at: Instant, now: Instant) -> u32 {
    let millis = expires_at.saturating_duration_since(now).as_millis();
    u32::try_from(millis.div_ceil(1000)).unwrap_or(u32::MAX)
}

impl GameState {
    /// Refresh the countdown and expire the responder once time runs out
    pub fn tick_timer(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        let Some(active) = self.active_question.as_mut() else {
            return outcome;
        };
        if active.status != QuestionPhase::Answering {
            return outcome;
        }
        let Some(expires_at) = active.expires_at else {
            return outcome;
        };

        let seconds = seconds_until(expires_at, now);
        if seconds != active.seconds_remaining {
            active.seconds_remaining = seconds;
            outcome.changed = true;
        }

        if now >= expires_at {
            let responder = active.responder;
            match responder {
                Some(slot) => self.apply_incorrect_answer(slot),
                None => active.expires_at = None,
            }
            outcome.changed = true;
            outcome.needs_persist = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::super::game::test_support::*;
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_counts_down_in_whole_seconds() {
        let mut game = game_with_players(2);
        let start = select(&mut game, "marvel-round1-100");

        let outcome = game.tick_timer(start + Duration::from_millis(400));
        assert_eq!(
            outcome,
            TickOutcome {
                changed: false,
                needs_persist: false
            }
        );
        assert_eq!(game.active_question().unwrap().seconds_remaining, 30);

        let outcome = game.tick_timer(start + Duration::from_millis(1500));
        assert!(outcome.changed);
        assert!(!outcome.needs_persist);
        assert_eq!(game.active_question().unwrap().seconds_remaining, 29);
    }

    #[test]
    fn test_expiry_applies_penalty_exactly_once() {
        let mut game = game_with_players(2);
        let start = select(&mut game, "marvel-round1-200");
        let late = start + Duration::from_secs(31);

        let first = game.tick_timer(late);
        assert!(first.changed && first.needs_persist);
        assert_eq!(game.player(0).unwrap().score, -100);

        let active = game.active_question().unwrap();
        assert_eq!(active.status, QuestionPhase::AwaitingBuzz);
        assert_eq!(active.seconds_remaining, DEFAULT_TIMER_SECONDS);

        let second = game.tick_timer(late + Duration::from_secs(5));
        assert_eq!(second, TickOutcome::default());
        assert_eq!(game.player(0).unwrap().score, -100);
    }

    #[test]
    fn test_expiry_at_exact_deadline() {
        let mut game = game_with_players(1);
        let start = select(&mut game, "marvel-round1-100");

        let outcome = game.tick_timer(start + Duration::from_secs(30));

        assert!(outcome.needs_persist);
        assert!(game.active_question().is_none());
        assert!(game.question_status("marvel-round1-100").unwrap().asked);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut game = game_with_players(2);
        assert_eq!(game.tick_timer(Instant::now()), TickOutcome::default());

        select(&mut game, "marvel-round1-100");
        game.mark_answer(Verdict::Incorrect).unwrap();
        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(game.tick_timer(later), TickOutcome::default());
    }

    #[test]
    fn test_seconds_until_rounds_up() {
        let now = Instant::now();
        assert_eq!(seconds_until(now + Duration::from_millis(1), now), 1);
        assert_eq!(seconds_until(now + Duration::from_millis(1000), now), 1);
        assert_eq!(seconds_until(now + Duration::from_millis(1001), now), 2);
        assert_eq!(seconds_until(now, now + Duration::from_secs(3)), 0);
    }
}
