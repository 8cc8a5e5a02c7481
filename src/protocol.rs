use crate::state::{GameError, GameView};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Router-level rejection codes, sent alongside the engine's own codes
pub const ADMIN_REQUIRED: &str = "admin-required";
pub const UNKNOWN_EVENT: &str = "unknown-event";
pub const INVALID_PAYLOAD: &str = "invalid-payload";
pub const NOT_JOINED: &str = "not-joined";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join", rename_all = "camelCase")]
    Join {
        #[serde(default)]
        role: Option<Role>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        session_id: Option<SessionId>,
    },
    #[serde(rename = "admin:selectQuestion", rename_all = "camelCase")]
    SelectQuestion { question_id: QuestionId },
    /// Verdict and slot index are left untyped so malformed values get the
    /// engine's reason codes instead of `invalid-payload`
    #[serde(rename = "admin:markAnswer")]
    MarkAnswer {
        #[serde(default)]
        verdict: serde_json::Value,
    },
    #[serde(rename = "admin:closeQuestion")]
    CloseQuestion {},
    /// Start over; players are dropped unless `dropPlayers` is false
    #[serde(rename = "admin:reset", rename_all = "camelCase")]
    Reset {
        #[serde(default = "default_true")]
        drop_players: bool,
    },
    #[serde(rename = "admin:kickPlayer", rename_all = "camelCase")]
    KickPlayer {
        #[serde(default)]
        slot_index: serde_json::Value,
    },
    #[serde(rename = "buzzer")]
    Buzzer {},
    #[serde(rename = "signal:relay", rename_all = "camelCase")]
    SignalRelay {
        target_session_id: SessionId,
        #[serde(default)]
        payload: serde_json::Value,
    },
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            ClientMessage::SelectQuestion { .. }
                | ClientMessage::MarkAnswer { .. }
                | ClientMessage::CloseQuestion {}
                | ClientMessage::Reset { .. }
                | ClientMessage::KickPlayer { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Joined {
        session_id: SessionId,
        role: Role,
        slot_index: Option<SlotIndex>,
        name: String,
    },
    State { payload: Box<GameView> },
    Error { message: String },
    Kicked { reason: KickReason },
    #[serde(rename_all = "camelCase")]
    Signal {
        from_session_id: SessionId,
        payload: serde_json::Value,
    },
}

impl ServerMessage {
    pub fn error(code: &str) -> Self {
        ServerMessage::Error {
            message: code.to_string(),
        }
    }

    pub fn state(view: GameView) -> Self {
        ServerMessage::State {
            payload: Box::new(view),
        }
    }
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::error(err.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "join", "role": "admin", "name": "Host", "sessionId": "abc"
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                role: Some(Role::Admin),
                name: Some("Host".to_string()),
                session_id: Some("abc".to_string()),
            }
        );

        let bare: ClientMessage = serde_json::from_value(json!({"type": "join"})).unwrap();
        assert!(matches!(
            bare,
            ClientMessage::Join {
                role: None,
                session_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_admin_events() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "admin:selectQuestion", "questionId": "marvel-round1-100"
        }))
        .unwrap();
        assert!(msg.requires_admin());

        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "admin:markAnswer", "verdict": 7})).unwrap();
        assert_eq!(msg, ClientMessage::MarkAnswer { verdict: json!(7) });

        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "admin:markAnswer"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MarkAnswer {
                verdict: serde_json::Value::Null
            }
        );

        let msg: ClientMessage = serde_json::from_value(json!({"type": "admin:reset"})).unwrap();
        assert_eq!(msg, ClientMessage::Reset { drop_players: true });

        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "admin:kickPlayer", "slotIndex": "two"}))
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::KickPlayer {
                slot_index: json!("two")
            }
        );

        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "admin:closeQuestion"})).unwrap();
        assert!(msg.requires_admin());
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "dance", "moves": 3})).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
        assert!(!msg.requires_admin());
    }

    #[test]
    fn test_signal_relay_keeps_payload_opaque() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "signal:relay", "targetSessionId": "b", "payload": {"sdp": "x", "n": [1, 2]}
        }))
        .unwrap();
        let ClientMessage::SignalRelay {
            target_session_id,
            payload,
        } = msg
        else {
            panic!("expected relay");
        };
        assert_eq!(target_session_id, "b");
        assert_eq!(payload["n"][1], 2);
    }

    #[test]
    fn test_server_message_shapes() {
        let joined = serde_json::to_value(ServerMessage::Joined {
            session_id: "s".to_string(),
            role: Role::Player,
            slot_index: None,
            name: "Ana".to_string(),
        })
        .unwrap();
        assert_eq!(joined["type"], "joined");
        assert_eq!(joined["sessionId"], "s");
        assert!(joined["slotIndex"].is_null());

        let kicked = serde_json::to_value(ServerMessage::Kicked {
            reason: KickReason::Reset,
        })
        .unwrap();
        assert_eq!(kicked, json!({"type": "kicked", "reason": "reset"}));

        let error = serde_json::to_value(ServerMessage::from(GameError::BuzzClosed)).unwrap();
        assert_eq!(error, json!({"type": "error", "message": "buzz-closed"}));

        let signal = serde_json::to_value(ServerMessage::Signal {
            from_session_id: "a".to_string(),
            payload: json!({"k": 1}),
        })
        .unwrap();
        assert_eq!(signal["fromSessionId"], "a");
    }
}
