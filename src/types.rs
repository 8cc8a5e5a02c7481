use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type QuestionId = String;
pub type CategoryId = String;
pub type SlotIndex = usize;

/// Number of fixed player seats
pub const MAX_PLAYERS: usize = 4;

/// Default answer timer length in seconds
pub const DEFAULT_TIMER_SECONDS: u32 = 30;

/// Share of a question's value deducted for a wrong answer
pub const PENALTY_FACTOR: f64 = 0.5;

pub const DEFAULT_ADMIN_NAME: &str = "Admin";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Player,
}

/// Admin verdict for the current responder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    #[serde(other)]
    Unknown,
}

/// Why a session was forcibly disconnected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KickReason {
    Reset,
    Kicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStatus {
    pub asked: bool,
    pub round_index: usize,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSlot {
    pub id: SessionId,
    pub slot_index: SlotIndex,
    pub name: String,
    pub score: i64,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminProfile {
    pub id: Option<SessionId>,
    pub name: String,
    pub connected: bool,
}

impl Default for AdminProfile {
    fn default() -> Self {
        Self {
            id: None,
            name: DEFAULT_ADMIN_NAME.to_string(),
            connected: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    Answering,
    AwaitingBuzz,
}

/// Set of slot indices packed into the low bits of a byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotSet(u8);

impl SlotSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, slot: SlotIndex) {
        if slot < MAX_PLAYERS {
            self.0 |= 1 << slot;
        }
    }

    pub fn contains(&self, slot: SlotIndex) -> bool {
        slot < MAX_PLAYERS && self.0 & (1 << slot) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        (0..MAX_PLAYERS).filter(move |slot| self.contains(*slot))
    }

    pub fn to_vec(&self) -> Vec<SlotIndex> {
        self.iter().collect()
    }
}

/// The question currently on screen
#[derive(Debug, Clone)]
pub struct ActiveQuestion {
    pub question_id: QuestionId,
    pub category_id: CategoryId,
    pub value: u32,
    pub round_index: usize,
    pub status: QuestionPhase,
    pub responder: Option<SlotIndex>,
    pub attempted: SlotSet,
    pub expires_at: Option<Instant>,
    pub seconds_remaining: u32,
}
