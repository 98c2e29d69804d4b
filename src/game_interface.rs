//! Module defining traits that need to be implemented to plug a game into the referee

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// What the referee needs to see of a game state.
///
/// Everything else about the state is opaque: it is forwarded unchanged to the players and to
/// the engine.
pub trait MatchState: Clone + Serialize {
    /// Seat index (0 or 1) of the player that should play now
    fn current_seat(&self) -> usize;

    /// Stable representation of the state, used to count repetitions.
    ///
    /// Two states that are equal for the rules of the game must return the same key. The
    /// default implementation goes through [`serde_json::Value`], whose objects keep their keys
    /// sorted, so field or map insertion order does not matter.
    ///
    /// A state that cannot be serialized gets an empty key, and a warning is logged.
    fn canonical_key(&self) -> String {
        match serde_json::to_value(self) {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!("state cannot be serialized, its key is empty: {e}");
                String::new()
            }
        }
    }
}

/// Result of applying a move to a state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    /// The move was legal, the game continues from the new state.
    Applied(S),
    /// The move breaks the rules. The state is left untouched, so the same player plays again.
    IllegalMove(String),
    /// The game is over, the player sitting at this seat won.
    Win(usize),
    /// The game is over without a winner.
    Draw,
}

/// What the game should implement
pub trait GameEngine {
    /// Type representing game state.
    type State: MatchState;
    /// What should be returned by players to make the game progress.
    type Move: DeserializeOwned + std::fmt::Debug;

    /// Returns the initial state for the given players, ordered by seat.
    fn init(&self, players: &[String]) -> Self::State;

    /// Apply `mv`, played by the current player, to `state`.
    ///
    /// Must be pure: the referee keeps `state` as is unless [`Transition::Applied`] is returned.
    fn apply(&self, state: &Self::State, mv: &Self::Move) -> Transition<Self::State>;
}
