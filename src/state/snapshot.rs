use super::game::fresh_question_status;
use super::GameState;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable subset of the game, written to disk between restarts.
///
/// Connection flags and the active question are never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub question_status: BTreeMap<QuestionId, SnapshotQuestion>,
    #[serde(default)]
    pub current_round_index: usize,
    #[serde(default)]
    pub turn_slot_index: SlotIndex,
    #[serde(default)]
    pub player_slots: Vec<Option<SnapshotPlayer>>,
    #[serde(default)]
    pub admin_profile: SnapshotAdmin,
    /// RFC 3339 time of the write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotQuestion {
    #[serde(default)]
    pub asked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPlayer {
    pub id: SessionId,
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub slot_index: SlotIndex,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapshotAdmin {
    #[serde(default)]
    pub id: Option<SessionId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Parts of a snapshot that did not fit the loaded catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub unknown_questions: Vec<QuestionId>,
    pub invalid_round_index: Option<usize>,
    pub invalid_turn_index: Option<SlotIndex>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_questions.is_empty()
            && self.invalid_round_index.is_none()
            && self.invalid_turn_index.is_none()
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            question_status: self
                .question_status
                .iter()
                .map(|(id, status)| (id.clone(), SnapshotQuestion { asked: status.asked }))
                .collect(),
            current_round_index: self.current_round_index,
            turn_slot_index: self.turn_slot_index,
            player_slots: self
                .player_slots
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|p| SnapshotPlayer {
                        id: p.id.clone(),
                        name: p.name.clone(),
                        score: p.score,
                        slot_index: p.slot_index,
                    })
                })
                .collect(),
            admin_profile: SnapshotAdmin {
                id: self.admin.id.clone(),
                name: Some(self.admin.name.clone()),
            },
            saved_at: None,
        }
    }

    /// Replace durable state with `snapshot`. Everyone starts disconnected
    /// and no question is active afterwards.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        self.question_status = fresh_question_status(&self.catalog);
        for (id, stored) in snapshot.question_status {
            match self.question_status.get_mut(&id) {
                Some(status) => status.asked = stored.asked,
                None => report.unknown_questions.push(id),
            }
        }

        if snapshot.current_round_index < self.catalog.round_count() {
            self.current_round_index = snapshot.current_round_index;
        } else {
            report.invalid_round_index = Some(snapshot.current_round_index);
        }

        if snapshot.turn_slot_index < MAX_PLAYERS {
            self.turn_slot_index = snapshot.turn_slot_index;
        } else {
            report.invalid_turn_index = Some(snapshot.turn_slot_index);
        }

        self.player_slots = Default::default();
        let stored_slots = snapshot.player_slots.into_iter().take(MAX_PLAYERS);
        for (index, stored) in stored_slots.enumerate() {
            if let Some(stored) = stored {
                self.player_slots[index] = Some(PlayerSlot {
                    id: stored.id,
                    slot_index: index,
                    name: stored.name,
                    score: stored.score,
                    connected: false,
                });
            }
        }

        self.admin = AdminProfile {
            id: snapshot.admin_profile.id.filter(|id| !id.is_empty()),
            name: snapshot
                .admin_profile
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string()),
            connected: false,
        };
        self.active_question = None;

        report
    }
}
