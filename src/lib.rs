//! # Ai Referee
//!
//! A Rust crate refereeing two-player, turn-based matches between remote AI agents.
//!
//! It provides:
//! - A match execution loop (`Referee`) polling each player in turn under a deadline
//! - A fault policy: each player has 3 lives, lost on illegal moves, late or malformed answers
//!   and unreachable connections
//! - Loop detection: a match reaching the same state for the third time is stopped
//! - A match record (`MatchRecord`) holding the outcome, faults and chat of the match
//!
//! The rules of the game are provided through the [`GameEngine`](crate::game_interface::GameEngine)
//! trait, and players are reached through the [`PlayerChannel`](crate::channel::PlayerChannel)
//! trait. A TCP implementation, [`TcpChannel`](crate::tcp_channel::TcpChannel), is provided.
//!
//! # Documentation Overview
//!
//! - For details about the match lifecycle and the fault policy, see the [`referee`] module.
//! - For timing parameters, see [`Configuration`](crate::configuration::Configuration).
//! - For implementing games, check out the [`MatchState`](crate::game_interface::MatchState)
//!   and [`GameEngine`](crate::game_interface::GameEngine) traits.
//! - For the messages exchanged with players over TCP, see the [`tcp_channel`] module.
//!
//! # Usage Example
//!
//! ```no_run
//! # use serde::{Deserialize, Serialize};
//! # use ai_referee::game_interface::Transition;
//! # #[derive(Clone, Serialize)]
//! # struct YourState { current: usize }
//! # impl ai_referee::game_interface::MatchState for YourState {
//! #     fn current_seat(&self) -> usize { self.current }
//! # }
//! # struct YourGame;
//! # impl ai_referee::game_interface::GameEngine for YourGame {
//! #     type State = YourState;
//! #     type Move = u32;
//! #     fn init(&self, _players: &[String]) -> YourState { YourState { current: 0 } }
//! #     fn apply(&self, _state: &YourState, _mv: &u32) -> Transition<YourState> { Transition::Draw }
//! # }
//! use ai_referee::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let referee = Referee::new(TcpChannel::new(), Configuration::from_env());
//!
//!     let mut record = MatchRecord::new(
//!         1,
//!         vec![
//!             ("alice".to_owned(), "127.0.0.1:4000".parse()?),
//!             ("bob".to_owned(), "127.0.0.1:4001".parse()?),
//!         ],
//!     );
//!
//!     match referee.run(&YourGame, &mut record).await? {
//!         RunOutcome::NotStarted => println!("a player is not there"),
//!         RunOutcome::Finished => println!("winner: {:?}", record.winner()),
//!     }
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub mod channel;
pub mod chat;
pub mod configuration;
mod cycle_detector;
pub mod game_interface;
mod logger;
pub mod match_record;
mod outcome;
mod player;
pub mod referee;
pub mod tcp_channel;

pub use anyhow;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use ai_referee::prelude::*;
/// ```
pub mod prelude {
    pub use crate::channel::{PlayerChannel, TransportError};
    pub use crate::chat::{ChatLog, ChatMessage};
    pub use crate::configuration::Configuration;
    pub use crate::game_interface::{GameEngine, MatchState, Transition};
    pub use crate::match_record::{ClientStatus, MatchRecord, MatchStatus, Participant};
    pub use crate::referee::{Referee, RunOutcome};
    pub use crate::tcp_channel::TcpChannel;
}
