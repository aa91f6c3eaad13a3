//! WebSocket message types for game service <-> player communication
//!
//! The player sends `ClientMessage` directives (tagged by `action`) and receives
//! `ServerMessage` events (tagged by `type`, with the event data under `payload`).
//!
//! ## Versioning Policy
//!
//! - New event kinds can be added on the server at any time (forward compatible)
//! - Unknown event kinds decode to `ServerMessage::Unknown` instead of failing
//! - Renaming an event kind or a payload field is a breaking change

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Win reason the server records when a turn timer runs out.
pub const TIMEOUT_WIN_REASON: &str = "timeout";

/// Message used when a server error event carries no text.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

// =============================================================================
// Client Messages (Player → Game service)
// =============================================================================

/// Directives from client (Player) to server (game service)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe this connection to a game's broadcasts
    JoinGame {
        #[serde(rename = "gameId")]
        game_id: String,
    },
    /// Play a word in the current game
    SubmitWord {
        #[serde(rename = "gameId")]
        game_id: Option<String>,
        word: String,
    },
    /// Stop receiving broadcasts for a game
    LeaveGame {
        #[serde(rename = "gameId")]
        game_id: Option<String>,
    },
}

impl ClientMessage {
    /// Wire name of the directive, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            ClientMessage::JoinGame { .. } => "join_game",
            ClientMessage::SubmitWord { .. } => "submit_word",
            ClientMessage::LeaveGame { .. } => "leave_game",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Server Messages (Game service → Player)
// =============================================================================

/// Events from server (game service) to client (Player)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Acknowledges a `join_game` directive
    JoinedGame { game_id: Option<String> },
    /// Both players are connected and the first word is in play
    GameStarted(GameStartedPayload),
    /// A player's word was accepted
    WordSubmitted(WordSubmittedPayload),
    /// The game finished
    GameEnded(GameEndedPayload),
    /// The game finished because a turn timer ran out
    GameEndedTimeout(GameEndedPayload),
    /// The server rejected something this client did
    Error(ErrorPayload),
    /// An event kind this client does not understand
    Unknown { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartedPayload {
    pub player1_id: String,
    pub player1_name: String,
    pub player2_id: String,
    pub player2_name: String,
    pub start_word: String,
    pub current_word: String,
    pub current_turn_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSubmittedPayload {
    pub player_id: String,
    pub player_name: String,
    pub word: String,
    pub current_turn_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEndedPayload {
    /// Absent (or empty) when the game ended without a winner
    #[serde(default)]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Errors raised while decoding an inbound event.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        source: serde_json::Error,
    },
}

/// Outer shape shared by every inbound event.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, rename = "gameId")]
    game_id: Option<String>,
    #[serde(default)]
    payload: Value,
}

impl ServerMessage {
    /// Decode a raw text frame.
    ///
    /// The envelope is decoded first; the payload is then decoded into the
    /// struct that belongs to the envelope's `type`. Unknown kinds are not an
    /// error.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(raw)?;

        Ok(match envelope.kind.as_str() {
            "joined_game" => ServerMessage::JoinedGame {
                game_id: envelope.game_id,
            },
            "game_started" => {
                ServerMessage::GameStarted(decode_payload("game_started", envelope.payload)?)
            }
            "word_submitted" => {
                ServerMessage::WordSubmitted(decode_payload("word_submitted", envelope.payload)?)
            }
            "game_ended" => {
                ServerMessage::GameEnded(decode_payload("game_ended", envelope.payload)?)
            }
            "game_ended_timeout" => ServerMessage::GameEndedTimeout(decode_payload(
                "game_ended_timeout",
                envelope.payload,
            )?),
            "error" => ServerMessage::Error(decode_payload("error", envelope.payload)?),
            _ => ServerMessage::Unknown {
                kind: envelope.kind,
            },
        })
    }

    /// Wire name of the event kind, for logging.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::JoinedGame { .. } => "joined_game",
            ServerMessage::GameStarted(_) => "game_started",
            ServerMessage::WordSubmitted(_) => "word_submitted",
            ServerMessage::GameEnded(_) => "game_ended",
            ServerMessage::GameEndedTimeout(_) => "game_ended_timeout",
            ServerMessage::Error(_) => "error",
            ServerMessage::Unknown { kind } => kind.as_str(),
        }
    }
}

/// A missing payload decodes like an empty object, so kinds whose fields are
/// all optional still parse.
fn decode_payload<T: DeserializeOwned>(
    kind: &'static str,
    payload: Value,
) -> Result<T, ProtocolError> {
    let payload = match payload {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(payload).map_err(|source| ProtocolError::Payload { kind, source })
}

#[cfg(test)]
mod serde_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_game_directive_uses_wire_names() {
        let msg = ClientMessage::JoinGame {
            game_id: "g1".to_string(),
        };

        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value, json!({ "action": "join_game", "gameId": "g1" }));
    }

    #[test]
    fn submit_word_without_game_serializes_null_id() {
        let msg = ClientMessage::SubmitWord {
            game_id: None,
            word: "cart".to_string(),
        };

        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({ "action": "submit_word", "gameId": null, "word": "cart" })
        );
    }

    #[test]
    fn leave_game_directive_uses_wire_names() {
        let msg = ClientMessage::LeaveGame {
            game_id: Some("g7".to_string()),
        };

        let json = msg.to_json().expect("serialize");
        let decoded: ClientMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, msg);
        assert!(json.contains("\"action\":\"leave_game\""));
    }

    #[test]
    fn parses_game_started() {
        let raw = json!({
            "type": "game_started",
            "gameId": "g1",
            "payload": {
                "player1Id": "p1",
                "player1Name": "Ada",
                "player2Id": "p2",
                "player2Name": "Grace",
                "startWord": "cold",
                "currentWord": "cold",
                "currentTurnId": "p1"
            }
        })
        .to_string();

        let msg = ServerMessage::parse(&raw).expect("parse");
        let ServerMessage::GameStarted(payload) = msg else {
            panic!("expected GameStarted, got {msg:?}");
        };
        assert_eq!(payload.player2_name, "Grace");
        assert_eq!(payload.start_word, "cold");
        assert_eq!(payload.current_turn_id, "p1");
    }

    #[test]
    fn parses_word_submitted() {
        let raw = r#"{"type":"word_submitted","payload":{"playerId":"p2","playerName":"Grace","word":"cord","currentTurnId":"p1"}}"#;

        let msg = ServerMessage::parse(raw).expect("parse");
        assert_eq!(
            msg,
            ServerMessage::WordSubmitted(WordSubmittedPayload {
                player_id: "p2".to_string(),
                player_name: "Grace".to_string(),
                word: "cord".to_string(),
                current_turn_id: "p1".to_string(),
            })
        );
    }

    #[test]
    fn game_ended_payload_fields_are_optional() {
        let msg = ServerMessage::parse(r#"{"type":"game_ended"}"#).expect("parse");
        assert_eq!(msg, ServerMessage::GameEnded(GameEndedPayload::default()));

        let raw = r#"{"type":"game_ended_timeout","payload":{"winnerId":"p1"}}"#;
        let msg = ServerMessage::parse(raw).expect("parse");
        assert_eq!(
            msg,
            ServerMessage::GameEndedTimeout(GameEndedPayload {
                winner_id: Some("p1".to_string()),
                reason: None,
            })
        );
    }

    #[test]
    fn parses_error_event() {
        let raw = r#"{"type":"error","gameId":"g1","payload":{"errorType":"submit_failed","message":"not_your_turn"}}"#;

        let msg = ServerMessage::parse(raw).expect("parse");
        let ServerMessage::Error(payload) = msg else {
            panic!("expected Error, got {msg:?}");
        };
        assert_eq!(payload.error_type.as_deref(), Some("submit_failed"));
        assert_eq!(payload.message.as_deref(), Some("not_your_turn"));
    }

    #[test]
    fn joined_game_keeps_envelope_game_id() {
        let msg = ServerMessage::parse(r#"{"type":"joined_game","gameId":"g9"}"#).expect("parse");
        assert_eq!(
            msg,
            ServerMessage::JoinedGame {
                game_id: Some("g9".to_string())
            }
        );
        assert_eq!(msg.kind(), "joined_game");
    }

    #[test]
    fn unknown_kind_is_not_an_error() {
        let msg = ServerMessage::parse(r#"{"type":"game_ready","payload":{"x":1}}"#).expect("parse");
        assert_eq!(
            msg,
            ServerMessage::Unknown {
                kind: "game_ready".to_string()
            }
        );
        assert_eq!(msg.kind(), "game_ready");
    }

    #[test]
    fn rejects_non_json() {
        let err = ServerMessage::parse("not json").expect_err("should fail");
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn rejects_missing_type() {
        let err = ServerMessage::parse(r#"{"payload":{}}"#).expect_err("should fail");
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn rejects_game_started_with_missing_fields() {
        let err = ServerMessage::parse(r#"{"type":"game_started","payload":{"player1Id":"p1"}}"#)
            .expect_err("should fail");
        assert!(matches!(
            err,
            ProtocolError::Payload {
                kind: "game_started",
                ..
            }
        ));
    }
}
