//! Typed lobby API.
//!
//! `LobbyApi` wraps an `Arc<dyn RawApiPort>` and turns raw JSON bodies into
//! validated results. A response that decodes but lacks a `gameId` is treated
//! exactly like a failed request.

use std::sync::Arc;

use delta_shared::{
    CreatePrivateGameResponse, FindGameResponse, JoinPrivateGameRequest,
    JoinPrivateGameResponse, CREATE_PRIVATE_GAME_PATH, FIND_GAME_PATH, JOIN_PRIVATE_GAME_PATH,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ports::outbound::{ApiError, RawApiPort};
use crate::state::GameStatus;

/// A matchmaking ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundGame {
    pub game_id: String,
    /// `Waiting` until an opponent is paired, then `Ready`
    pub status: GameStatus,
}

/// A private room this client owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGame {
    pub game_id: String,
    pub join_code: String,
}

/// A private room this client joined by code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub game_id: String,
}

#[derive(Clone)]
pub struct LobbyApi {
    raw: Arc<dyn RawApiPort>,
}

impl LobbyApi {
    pub fn new(raw: Arc<dyn RawApiPort>) -> Self {
        Self { raw }
    }

    /// `GET /api/game/find`
    pub async fn find_game(&self) -> Result<FoundGame, ApiError> {
        let res: FindGameResponse = decode(self.raw.get_json(FIND_GAME_PATH).await?)?;
        let game_id = required("gameId", res.game_id)?;

        let status = match res.status.as_deref() {
            Some("waiting") => GameStatus::Waiting,
            Some("matched") | Some("ready") => GameStatus::Ready,
            other => {
                tracing::warn!(
                    game_id = %game_id,
                    status = ?other,
                    "Unrecognised matchmaking status, treating as waiting"
                );
                GameStatus::Waiting
            }
        };

        Ok(FoundGame { game_id, status })
    }

    /// `POST /api/game/private/create`
    pub async fn create_private_game(&self) -> Result<CreatedGame, ApiError> {
        let body = Value::Object(serde_json::Map::new());
        let res: CreatePrivateGameResponse =
            decode(self.raw.post_json(CREATE_PRIVATE_GAME_PATH, &body).await?)?;

        Ok(CreatedGame {
            game_id: required("gameId", res.game_id)?,
            join_code: required("joinCode", res.join_code)?,
        })
    }

    /// `POST /api/game/private/join`
    pub async fn join_private_game(&self, join_code: &str) -> Result<JoinedRoom, ApiError> {
        let body = serde_json::to_value(JoinPrivateGameRequest {
            join_code: join_code.to_string(),
        })
        .map_err(|e| ApiError::SerializeError(e.to_string()))?;
        let res: JoinPrivateGameResponse =
            decode(self.raw.post_json(JOIN_PRIVATE_GAME_PATH, &body).await?)?;

        Ok(JoinedRoom {
            game_id: required("gameId", res.game_id)?,
        })
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    if value.is_null() {
        return Err(ApiError::ParseError("empty response body".to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::ParseError(e.to_string()))
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingField(field))
}
