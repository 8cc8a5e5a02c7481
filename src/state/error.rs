/// Rejection reasons for game actions.
///
/// Each variant maps to a stable reason code that is sent to clients verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("join requires a session id")]
    MissingSession,

    #[error("another admin is already connected")]
    AdminExists,

    #[error("all player slots are taken")]
    PlayersFull,

    #[error("a question is already active")]
    QuestionAlreadyActive,

    #[error("unknown question")]
    UnknownQuestion,

    #[error("question belongs to a different round")]
    WrongRound,

    #[error("question was already asked")]
    QuestionUsed,

    #[error("no connected player holds the turn")]
    NoActivePlayer,

    #[error("nobody is answering right now")]
    NoResponder,

    #[error("verdict must be correct or incorrect")]
    UnknownVerdict,

    #[error("no question is active")]
    NoActiveQuestion,

    #[error("buzzing is closed")]
    BuzzClosed,

    #[error("session does not hold a player slot")]
    NotPlayer,

    #[error("player already tried this question")]
    AlreadyTried,

    #[error("player is offline")]
    PlayerOffline,

    #[error("slot index out of range")]
    InvalidSlot,

    #[error("slot is empty")]
    SlotEmpty,
}

impl GameError {
    /// Stable reason code surfaced in `error` messages
    pub fn code(&self) -> &'static str {
        match self {
            GameError::MissingSession => "missing-session",
            GameError::AdminExists => "admin-exists",
            GameError::PlayersFull => "players-full",
            GameError::QuestionAlreadyActive => "question-already-active",
            GameError::UnknownQuestion => "unknown-question",
            GameError::WrongRound => "wrong-round",
            GameError::QuestionUsed => "question-used",
            GameError::NoActivePlayer => "no-active-player",
            GameError::NoResponder => "no-responder",
            GameError::UnknownVerdict => "unknown-verdict",
            GameError::NoActiveQuestion => "no-active-question",
            GameError::BuzzClosed => "buzz-closed",
            GameError::NotPlayer => "not-player",
            GameError::AlreadyTried => "already-tried",
            GameError::PlayerOffline => "player-offline",
            GameError::InvalidSlot => "invalid-slot",
            GameError::SlotEmpty => "slot-empty",
        }
    }
}
