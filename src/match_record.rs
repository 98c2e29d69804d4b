//! Record of a match, read by persistence and reporting while the referee fills it.
//!
//! A record is created [`Pending`](MatchStatus::Pending), goes [`Running`](MatchStatus::Running)
//! once both players answered the liveness check, and is [`Done`](MatchStatus::Done) after the
//! outcome was resolved. Each transition happens at most once, and a finished record is never
//! modified again.

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::chat::ChatLog;

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Created, not started yet
    Pending,
    /// Both players answered, turns are being played
    Running,
    /// The outcome is known
    Done,
}

/// Last known state of the connection with a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    /// Not contacted yet
    #[default]
    Unknown,
    /// Answered the last request
    Ready,
    /// Could not be reached on the last request
    Unreachable,
}

/// A player as seen from outside the match.
#[derive(Debug, Clone, Serialize)]
pub struct Participant<H> {
    /// Display name, used in the chat
    pub name: String,
    /// How the player is reached
    pub handle: H,
    /// Last known connection state
    pub status: ClientStatus,
}

/// A match between two players, filled by the [`Referee`](crate::referee::Referee).
///
/// `H` is the player handle of the [`PlayerChannel`](crate::channel::PlayerChannel) in use.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord<H> {
    pub(crate) id: u64,
    pub(crate) status: MatchStatus,
    pub(crate) players: Vec<Participant<H>>,
    pub(crate) state: Option<Value>,
    pub(crate) moves: u32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub(crate) start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub(crate) end: Option<OffsetDateTime>,
    pub(crate) winner: Option<H>,
    pub(crate) faults: Vec<usize>,
    pub(crate) chat: ChatLog,
}

impl<H: Clone> MatchRecord<H> {
    /// Creates a pending match between `players`, given as `(name, handle)` ordered by seat.
    pub fn new(id: u64, players: Vec<(String, H)>) -> MatchRecord<H> {
        let faults = vec![0; players.len()];
        MatchRecord {
            id,
            status: MatchStatus::Pending,
            players: players
                .into_iter()
                .map(|(name, handle)| Participant {
                    name,
                    handle,
                    status: ClientStatus::Unknown,
                })
                .collect(),
            state: None,
            moves: 0,
            start: None,
            end: None,
            winner: None,
            faults,
            chat: ChatLog::new(),
        }
    }

    /// Identifier given at creation
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Where the match is in its lifecycle
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Returns `true` once the outcome is recorded.
    pub fn is_done(&self) -> bool {
        self.status == MatchStatus::Done
    }

    /// Participants, ordered by seat
    pub fn players(&self) -> &[Participant<H>] {
        &self.players
    }

    /// Current state of the game. `None` before the match starts and once it is finished.
    pub fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    /// Number of accepted moves
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// When the match went running
    pub fn start(&self) -> Option<OffsetDateTime> {
        self.start
    }

    /// When the outcome was recorded
    pub fn end(&self) -> Option<OffsetDateTime> {
        self.end
    }

    /// Handle of the winner. `None` until the match is done, and for a draw.
    pub fn winner(&self) -> Option<&H> {
        self.winner.as_ref()
    }

    /// Number of faults of each player, ordered by seat. Filled when the match is done.
    pub fn faults(&self) -> &[usize] {
        &self.faults
    }

    /// Announcements of the referee and messages of the players
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub(crate) fn begin(&mut self, state: Value) {
        debug_assert_eq!(self.status, MatchStatus::Pending);
        self.status = MatchStatus::Running;
        self.start = Some(OffsetDateTime::now_utc());
        self.state = Some(state);
    }

    pub(crate) fn set_client_status(&mut self, seat: usize, status: ClientStatus) {
        if let Some(participant) = self.players.get_mut(seat) {
            participant.status = status;
        }
    }
}
