use super::GameState;
use crate::types::*;
use serde::Serialize;

/// Per-viewer projection of the game, sent in `state` messages
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub round_number: usize,
    pub round_title: String,
    pub total_rounds: usize,
    pub admin: AdminView,
    pub categories: Vec<CategoryView>,
    pub players: Vec<PlayerView>,
    pub active_question: Option<ActiveQuestionView>,
    pub timer_seconds: u32,
    pub next_round_ready: bool,
    pub game_finished: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub session_id: Option<SessionId>,
    pub name: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryView {
    pub id: CategoryId,
    pub title: String,
    pub questions: Vec<BoardQuestionView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoardQuestionView {
    pub id: QuestionId,
    pub value: u32,
    pub asked: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub slot_index: SlotIndex,
    pub session_id: Option<SessionId>,
    pub name: String,
    pub score: i64,
    pub connected: bool,
    pub is_turn: bool,
    pub is_answering: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveQuestionView {
    pub id: QuestionId,
    pub category_id: CategoryId,
    pub prompt: String,
    pub value: u32,
    pub status: QuestionPhase,
    pub responding_slot: Option<SlotIndex>,
    pub seconds_remaining: u32,
    pub attempted_slots: Vec<SlotIndex>,
    pub buzzable_slots: Vec<SlotIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Only present in the admin projection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl GameState {
    /// Build the projection for one kind of viewer. Only admins see answers.
    pub fn view(&self, viewer_is_admin: bool) -> GameView {
        let round = self.current_round();
        let active_id = self.active_question.as_ref().map(|q| q.question_id.as_str());

        let categories = round
            .categories
            .iter()
            .map(|category| CategoryView {
                id: category.id.clone(),
                title: category.title.clone(),
                questions: category
                    .questions
                    .iter()
                    .map(|q| BoardQuestionView {
                        id: q.id.clone(),
                        value: q.value,
                        asked: self.question_status.get(&q.id).is_some_and(|s| s.asked),
                        active: active_id == Some(q.id.as_str()),
                    })
                    .collect(),
            })
            .collect();

        let responder = self.active_question.as_ref().and_then(|q| q.responder);
        let players = self
            .player_slots
            .iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(player) => PlayerView {
                    slot_index: index,
                    session_id: Some(player.id.clone()),
                    name: player.name.clone(),
                    score: player.score,
                    connected: player.connected,
                    is_turn: index == self.turn_slot_index,
                    is_answering: responder == Some(index),
                },
                None => PlayerView {
                    slot_index: index,
                    session_id: None,
                    name: format!("Slot {}", index + 1),
                    score: 0,
                    connected: false,
                    is_turn: false,
                    is_answering: false,
                },
            })
            .collect();

        let active_question = self.active_question.as_ref().map(|active| {
            let question = self.catalog.find(&active.question_id).map(|(_, q)| q);
            ActiveQuestionView {
                id: active.question_id.clone(),
                category_id: active.category_id.clone(),
                prompt: question.map(|q| q.prompt.clone()).unwrap_or_default(),
                value: active.value,
                status: active.status,
                responding_slot: active.responder,
                seconds_remaining: active.seconds_remaining,
                attempted_slots: active.attempted.to_vec(),
                buzzable_slots: self.eligible_buzzers(),
                media: question.and_then(|q| q.media.clone()),
                answer: question
                    .filter(|_| viewer_is_admin)
                    .map(|q| q.answer.clone()),
            }
        });

        GameView {
            round_number: self.current_round_index + 1,
            round_title: round.title.clone(),
            total_rounds: self.catalog.round_count(),
            admin: AdminView {
                session_id: self.admin.id.clone(),
                name: self.admin.name.clone(),
                connected: self.admin.connected,
            },
            categories,
            players,
            timer_seconds: active_question
                .as_ref()
                .map_or(self.timer_seconds, |q| q.seconds_remaining),
            active_question,
            next_round_ready: self.next_round_ready(),
            game_finished: self.is_game_finished(),
        }
    }
}
