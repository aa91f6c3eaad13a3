//! Game session state machine.
//!
//! # State Diagram
//!
//! ```text
//!              find / create / join ok
//! ┌──────┐ ─────────────────────────────▶ ┌──────────────────┐
//! │ Idle │                                 │ Waiting / Ready  │
//! └──────┘ ◀──────────┐                    └────────┬─────────┘
//!     ▲               │ request failed              │ game_started
//!     │               │                             ▼
//!     │          ┌────┴─────┐  game_ended    ┌──────────┐
//!     │          │Completed │ ◀───────────── │  Active  │◀─┐
//!     │          └──────────┘  (or timeout)  └────┬─────┘  │ word_submitted
//!     │                                           └────────┘
//!     └──────────────── leave (from any state) ─────────────
//! ```
//!
//! `game_id` is `Some` exactly when the status is not `Idle`.

use std::fmt;

use chrono::{DateTime, Utc};
use delta_shared::{GameEndedPayload, GameStartedPayload, WordSubmittedPayload, TIMEOUT_WIN_REASON};

/// Where the tracked game is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameStatus {
    /// No game tracked
    #[default]
    Idle,
    /// Game exists, waiting for an opponent
    Waiting,
    /// Opponent found, waiting for the server to start the game
    Ready,
    /// Words are being played
    Active,
    /// Game finished; see `GameSession::outcome`
    Completed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// How the tracked game was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    /// Anonymous matchmaking
    Matched,
    /// Private room joined or created with a code
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub display_name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Sentinel author of the synthetic start turn.
    pub fn nobody() -> Self {
        Self::new("", "")
    }

    pub fn is_nobody(&self) -> bool {
        self.id.is_empty()
    }
}

/// One word played in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub player: Player,
    pub word: String,
    /// Local receipt time of the event
    pub timestamp: DateTime<Utc>,
}

/// How a completed game ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// `None` on a draw or when the server named no winner
    pub winner_id: Option<String>,
    pub win_reason: Option<String>,
}

impl Outcome {
    pub fn is_timeout(&self) -> bool {
        self.win_reason.as_deref() == Some(TIMEOUT_WIN_REASON)
    }
}

/// Error when an event arrives in a status that does not accept it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event} while {status}")]
pub struct InvalidTransition {
    pub event: &'static str,
    pub status: GameStatus,
}

/// The single tracked game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSession {
    pub game_id: Option<String>,
    pub kind: Option<GameKind>,
    pub status: GameStatus,
    /// Only set for private games this client created
    pub join_code: Option<String>,
    /// Last error reported by the server
    pub error: Option<String>,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    /// Oldest first; the first entry is the start word
    pub turns: Vec<Turn>,
    pub current_word: Option<String>,
    /// Player id whose turn is next
    pub current_turn_id: Option<String>,
    pub outcome: Option<Outcome>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.status == GameStatus::Idle
    }

    /// Forget the tracked game entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Track a game the lobby API just handed us, replacing anything tracked before.
    pub fn begin(
        &mut self,
        game_id: String,
        kind: GameKind,
        status: GameStatus,
        join_code: Option<String>,
    ) {
        debug_assert!(status != GameStatus::Idle, "a tracked game is never idle");
        *self = Self {
            game_id: Some(game_id),
            kind: Some(kind),
            status,
            join_code,
            ..Self::default()
        };
    }

    /// Both players are in; the start word becomes the first turn.
    pub fn start(
        &mut self,
        payload: GameStartedPayload,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if !matches!(self.status, GameStatus::Waiting | GameStatus::Ready) {
            return Err(self.rejected("game_started"));
        }

        self.status = GameStatus::Active;
        self.current_word = Some(payload.current_word);
        self.current_turn_id = Some(payload.current_turn_id);
        self.player1 = Some(Player::new(payload.player1_id, payload.player1_name));
        self.player2 = Some(Player::new(payload.player2_id, payload.player2_name));
        self.turns = vec![Turn {
            player: Player::nobody(),
            word: payload.start_word,
            timestamp: now,
        }];
        Ok(())
    }

    /// A player's word was accepted by the server.
    pub fn record_word(
        &mut self,
        payload: WordSubmittedPayload,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if self.status != GameStatus::Active {
            return Err(self.rejected("word_submitted"));
        }

        self.current_word = Some(payload.word.clone());
        self.current_turn_id = Some(payload.current_turn_id);
        self.turns.push(Turn {
            player: Player::new(payload.player_id, payload.player_name),
            word: payload.word,
            timestamp: now,
        });
        Ok(())
    }

    /// The game is over. `timed_out` supplies the timeout reason when the
    /// server sent none.
    pub fn finish(
        &mut self,
        payload: GameEndedPayload,
        timed_out: bool,
    ) -> Result<(), InvalidTransition> {
        if self.status != GameStatus::Active {
            let event = if timed_out {
                "game_ended_timeout"
            } else {
                "game_ended"
            };
            return Err(self.rejected(event));
        }

        let win_reason = match payload.reason {
            Some(reason) => Some(reason),
            None if timed_out => Some(TIMEOUT_WIN_REASON.to_string()),
            None => None,
        };

        self.status = GameStatus::Completed;
        self.outcome = Some(Outcome {
            winner_id: payload.winner_id.filter(|id| !id.is_empty()),
            win_reason,
        });
        Ok(())
    }

    /// Record a server-reported error. Never changes the status.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether `player_id` is expected to play the next word.
    pub fn is_turn_of(&self, player_id: &str) -> bool {
        self.status == GameStatus::Active && self.current_turn_id.as_deref() == Some(player_id)
    }

    /// The winning player, if the game is over and the winner is one of ours.
    pub fn winner(&self) -> Option<&Player> {
        let winner_id = self.outcome.as_ref()?.winner_id.as_deref()?;
        [self.player1.as_ref(), self.player2.as_ref()]
            .into_iter()
            .flatten()
            .find(|p| p.id == winner_id)
    }

    fn rejected(&self, event: &'static str) -> InvalidTransition {
        InvalidTransition {
            event,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().expect("valid timestamp")
    }

    fn started_payload() -> GameStartedPayload {
        GameStartedPayload {
            player1_id: "p1".to_string(),
            player1_name: "Ada".to_string(),
            player2_id: "p2".to_string(),
            player2_name: "Grace".to_string(),
            start_word: "cold".to_string(),
            current_word: "cold".to_string(),
            current_turn_id: "p1".to_string(),
        }
    }

    fn submitted(player: &str, word: &str, next: &str) -> WordSubmittedPayload {
        WordSubmittedPayload {
            player_id: player.to_string(),
            player_name: format!("name-{player}"),
            word: word.to_string(),
            current_turn_id: next.to_string(),
        }
    }

    fn active_session() -> GameSession {
        let mut session = GameSession::new();
        session.begin("g1".to_string(), GameKind::Matched, GameStatus::Waiting, None);
        session.start(started_payload(), at(0)).expect("start");
        session
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = GameSession::new();
        assert!(session.is_idle());
        assert_eq!(session.game_id, None);
        assert!(session.turns.is_empty());
        assert_eq!(session.status.to_string(), "idle");
    }

    #[test]
    fn begin_replaces_previous_game() {
        let mut session = active_session();
        session.record_error("stale");

        session.begin(
            "g2".to_string(),
            GameKind::Private,
            GameStatus::Waiting,
            Some("ABCD".to_string()),
        );

        assert_eq!(session.game_id.as_deref(), Some("g2"));
        assert_eq!(session.kind, Some(GameKind::Private));
        assert_eq!(session.join_code.as_deref(), Some("ABCD"));
        assert!(session.turns.is_empty());
        assert_eq!(session.error, None);
        assert_eq!(session.player1, None);
    }

    #[test]
    fn start_sets_players_and_start_turn() {
        let session = active_session();

        assert_eq!(session.status, GameStatus::Active);
        assert_eq!(session.current_word.as_deref(), Some("cold"));
        assert_eq!(session.current_turn_id.as_deref(), Some("p1"));
        assert_eq!(session.player1, Some(Player::new("p1", "Ada")));
        assert_eq!(session.player2, Some(Player::new("p2", "Grace")));
        assert_eq!(session.turns.len(), 1);
        assert!(session.turns[0].player.is_nobody());
        assert_eq!(session.turns[0].word, "cold");
        assert_eq!(session.turns[0].timestamp, at(0));
    }

    #[test]
    fn start_from_ready() {
        let mut session = GameSession::new();
        session.begin("g1".to_string(), GameKind::Private, GameStatus::Ready, None);

        assert!(session.start(started_payload(), at(0)).is_ok());
        assert_eq!(session.status, GameStatus::Active);
    }

    #[test]
    fn start_rejected_when_idle() {
        let mut session = GameSession::new();

        let err = session.start(started_payload(), at(0)).expect_err("idle");
        assert_eq!(err.event, "game_started");
        assert_eq!(err.status, GameStatus::Idle);
        assert_eq!(session, GameSession::new());
    }

    #[test]
    fn start_rejected_when_already_active() {
        let mut session = active_session();
        session
            .record_word(submitted("p1", "cord", "p2"), at(1))
            .expect("word");
        let before = session.clone();

        assert!(session.start(started_payload(), at(2)).is_err());
        assert_eq!(session, before);
    }

    #[test]
    fn words_append_in_order() {
        let mut session = active_session();

        session
            .record_word(submitted("p1", "cord", "p2"), at(1))
            .expect("first");
        session
            .record_word(submitted("p2", "card", "p1"), at(2))
            .expect("second");

        let words: Vec<&str> = session.turns.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["cold", "cord", "card"]);
        assert_eq!(session.turns[1].player.id, "p1");
        assert_eq!(session.turns[2].player.display_name, "name-p2");
        assert_eq!(session.turns[2].timestamp, at(2));
        assert_eq!(session.current_word.as_deref(), Some("card"));
        assert!(session.is_turn_of("p1"));
        assert!(!session.is_turn_of("p2"));
    }

    #[test]
    fn word_rejected_before_start() {
        let mut session = GameSession::new();
        session.begin("g1".to_string(), GameKind::Matched, GameStatus::Waiting, None);

        let err = session
            .record_word(submitted("p1", "cord", "p2"), at(1))
            .expect_err("not active");
        assert_eq!(err.status, GameStatus::Waiting);
        assert!(session.turns.is_empty());
    }

    #[test]
    fn finish_records_outcome() {
        let mut session = active_session();

        session
            .finish(
                GameEndedPayload {
                    winner_id: Some("p2".to_string()),
                    reason: Some("invalid_word".to_string()),
                },
                false,
            )
            .expect("finish");

        assert_eq!(session.status, GameStatus::Completed);
        let outcome = session.outcome.clone().expect("outcome");
        assert_eq!(outcome.winner_id.as_deref(), Some("p2"));
        assert_eq!(outcome.win_reason.as_deref(), Some("invalid_word"));
        assert!(!outcome.is_timeout());
        assert_eq!(session.winner(), Some(&Player::new("p2", "Grace")));
        assert_eq!(session.turns.len(), 1);
    }

    #[test]
    fn timeout_defaults_reason() {
        let mut session = active_session();

        session
            .finish(
                GameEndedPayload {
                    winner_id: Some("p1".to_string()),
                    reason: None,
                },
                true,
            )
            .expect("finish");

        let outcome = session.outcome.expect("outcome");
        assert_eq!(outcome.winner_id.as_deref(), Some("p1"));
        assert_eq!(outcome.win_reason.as_deref(), Some(TIMEOUT_WIN_REASON));
        assert!(outcome.is_timeout());
    }

    #[test]
    fn plain_end_without_reason_has_none() {
        let mut session = active_session();

        session
            .finish(GameEndedPayload::default(), false)
            .expect("finish");

        assert_eq!(session.outcome, Some(Outcome::default()));
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn empty_winner_id_means_no_winner() {
        let mut session = active_session();

        session
            .finish(
                GameEndedPayload {
                    winner_id: Some(String::new()),
                    reason: Some("draw".to_string()),
                },
                false,
            )
            .expect("finish");

        assert_eq!(session.outcome.expect("outcome").winner_id, None);
    }

    #[test]
    fn finish_rejected_unless_active() {
        let mut session = GameSession::new();
        session.begin("g1".to_string(), GameKind::Matched, GameStatus::Ready, None);

        let err = session
            .finish(GameEndedPayload::default(), true)
            .expect_err("not active");
        assert_eq!(err.event, "game_ended_timeout");
        assert_eq!(session.status, GameStatus::Ready);
        assert_eq!(session.outcome, None);
    }

    #[test]
    fn error_keeps_status() {
        let mut session = active_session();

        session.record_error("room full");

        assert_eq!(session.error.as_deref(), Some("room full"));
        assert_eq!(session.status, GameStatus::Active);

        session.clear_error();
        assert_eq!(session.error, None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = active_session();
        session.record_error("boom");

        session.reset();

        assert_eq!(session, GameSession::default());
    }
}
