//! Test fixtures: a fixed clock and builders for inbound server events.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::ports::outbound::{ApiError, ClockPort};

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 2023-11-14T22:13:20Z
    pub fn at_epoch() -> Self {
        Self::new(epoch())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The instant `FixedClock::at_epoch` starts at.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_default()
}

pub fn api_request_failed(msg: &str) -> ApiError {
    ApiError::RequestFailed(msg.to_string())
}

pub fn joined_game(game_id: &str) -> String {
    json!({ "type": "joined_game", "gameId": game_id }).to_string()
}

/// `game_started` between p1 "Ada" and p2 "Grace", p1 to play first.
pub fn game_started(game_id: &str, start_word: &str) -> String {
    event(
        "game_started",
        game_id,
        json!({
            "player1Id": "p1",
            "player1Name": "Ada",
            "player2Id": "p2",
            "player2Name": "Grace",
            "startWord": start_word,
            "currentWord": start_word,
            "currentTurnId": "p1",
        }),
    )
}

pub fn word_submitted(game_id: &str, player_id: &str, word: &str, next_turn_id: &str) -> String {
    event(
        "word_submitted",
        game_id,
        json!({
            "playerId": player_id,
            "playerName": player_name(player_id),
            "word": word,
            "currentTurnId": next_turn_id,
        }),
    )
}

pub fn game_ended(game_id: &str, winner_id: Option<&str>, reason: Option<&str>) -> String {
    event("game_ended", game_id, ended_payload(winner_id, reason))
}

pub fn game_ended_timeout(game_id: &str, winner_id: Option<&str>, reason: Option<&str>) -> String {
    event("game_ended_timeout", game_id, ended_payload(winner_id, reason))
}

pub fn error_event(error_type: &str, message: Option<&str>) -> String {
    let mut payload = json!({ "errorType": error_type });
    if let Some(message) = message {
        payload["message"] = json!(message);
    }
    json!({ "type": "error", "payload": payload }).to_string()
}

/// Display name the builders use for a player id.
pub fn player_name(player_id: &str) -> &'static str {
    match player_id {
        "p1" => "Ada",
        "p2" => "Grace",
        _ => "Someone",
    }
}

fn ended_payload(winner_id: Option<&str>, reason: Option<&str>) -> Value {
    let mut payload = json!({});
    if let Some(winner_id) = winner_id {
        payload["winnerId"] = json!(winner_id);
    }
    if let Some(reason) = reason {
        payload["reason"] = json!(reason);
    }
    payload
}

fn event(kind: &str, game_id: &str, payload: Value) -> String {
    json!({ "type": kind, "gameId": game_id, "payload": payload }).to_string()
}
