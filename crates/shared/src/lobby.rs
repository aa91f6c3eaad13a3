//! REST DTOs for the lobby endpoints (matchmaking and private rooms)
//!
//! Every response field is optional on the wire; the player decides which
//! ones are required before it trusts a response.

use serde::{Deserialize, Serialize};

/// Anonymous matchmaking.
pub const FIND_GAME_PATH: &str = "/api/game/find";
/// Create a private room and get its join code.
pub const CREATE_PRIVATE_GAME_PATH: &str = "/api/game/private/create";
/// Join a private room by code.
pub const JOIN_PRIVATE_GAME_PATH: &str = "/api/game/private/join";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindGameResponse {
    #[serde(default)]
    pub game_id: Option<String>,
    /// "waiting" or "matched"
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrivateGameResponse {
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub join_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPrivateGameRequest {
    pub join_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPrivateGameResponse {
    #[serde(default)]
    pub game_id: Option<String>,
    /// "matched" or "error"
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_request_uses_camel_case() {
        let body = JoinPrivateGameRequest {
            join_code: "ABCD".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({ "joinCode": "ABCD" })
        );
    }

    #[test]
    fn find_response_tolerates_missing_fields() {
        let res: FindGameResponse = serde_json::from_value(json!({})).expect("deserialize");
        assert_eq!(res, FindGameResponse::default());

        let res: FindGameResponse =
            serde_json::from_value(json!({ "gameId": "g1", "status": "waiting" }))
                .expect("deserialize");
        assert_eq!(res.game_id.as_deref(), Some("g1"));
        assert_eq!(res.status.as_deref(), Some("waiting"));
    }
}
