//! Core match execution.
//!
//! This module defines the [`Referee`], which drives a two-player match from start to finish:
//!
//! - Both players must answer a liveness check, otherwise the match does not start
//! - Players are asked for a move in turn, under a deadline
//! - Moves are validated and applied through the [`GameEngine`]
//! - Every misbehavior costs the player one of its lives
//! - The match ends on a win, a draw, a give-up, a player running out of lives, or when the
//!   same state is reached for the third time
//!
//! # Faults
//!
//! A player starts with 3 lives and loses one for each:
//!
//! - illegal move (the player plays again)
//! - move accepted but received after the deadline
//! - response with an unknown `response` kind
//! - unreachable player, undecodable or incomplete response. The referee then waits for the
//!   configured retry delay before asking again
//!
//! A player without lives loses the match. Every fault is logged and announced in the chat.

use std::time::Duration;

use anyhow::{ensure, Context};
use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{interval, sleep, Interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::channel::{PlayerChannel, TransportError};
use crate::configuration::Configuration;
use crate::cycle_detector::CycleDetector;
use crate::game_interface::{GameEngine, MatchState, Transition};
use crate::logger::init_logger;
use crate::match_record::{ClientStatus, MatchRecord, MatchStatus};
use crate::outcome::{resolve, Termination};
use crate::player::{Fault, Player};

/// Result of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The match goes on
    Continue,
    /// Seat of the winner
    Win(usize),
    /// The game ended without a winner
    Draw,
    /// The state just reached was already reached twice
    LoopDetected,
}

/// What [`Referee::run`] did with the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A player did not answer the liveness check. The record is still pending.
    NotStarted,
    /// The match was played, the record is done.
    Finished,
}

#[derive(Error, Debug)]
enum TurnError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("could not encode request: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct TurnRequest<'a, S> {
    request: &'static str,
    lives: usize,
    errors: &'a [Fault],
    state: &'a S,
}

#[derive(Debug, PartialEq)]
enum Reply<M> {
    Move(M, Value),
    GiveUp,
    Other(String),
}

fn parse_reply<M: DeserializeOwned>(response: &Value) -> Result<Reply<M>, TurnError> {
    let kind = response
        .get("response")
        .ok_or_else(|| TurnError::Malformed("missing field 'response'".to_owned()))?;
    match kind.as_str() {
        Some("move") => {
            let raw = response
                .get("move")
                .ok_or_else(|| TurnError::Malformed("missing field 'move'".to_owned()))?;
            let mv = M::deserialize(raw)
                .map_err(|e| TurnError::Malformed(format!("invalid move {raw}: {e}")))?;
            Ok(Reply::Move(mv, raw.clone()))
        }
        Some("giveup") => Ok(Reply::GiveUp),
        Some(other) => Ok(Reply::Other(other.to_owned())),
        None => Ok(Reply::Other(kind.to_string())),
    }
}

fn opponent(seat: usize) -> usize {
    (seat + 1) % 2
}

/// Everything that lives for the duration of one match
struct Session<'r, E: GameEngine, H> {
    engine: &'r E,
    record: &'r mut MatchRecord<H>,
    players: Vec<Player<H>>,
    state: E::State,
    detector: CycleDetector,
}

impl<E: GameEngine, H: Clone> Session<'_, E, H> {
    fn snapshot(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or_else(|e| {
            warn!("state cannot be serialized: {e}");
            Value::Null
        })
    }

    fn current_seat(&self) -> anyhow::Result<usize> {
        let seat = self.state.current_seat();
        ensure!(
            seat < self.players.len(),
            "game engine returned an invalid current seat: {seat}"
        );
        Ok(seat)
    }

    /// Logs the fault, charges it to the player and announces it in the chat.
    fn charge(&mut self, seat: usize, msg: String, offending_move: Option<Value>) {
        warn!("{msg}");
        let snapshot = self.snapshot();
        self.players[seat].charge(msg.clone(), snapshot, offending_move);
        self.record.chat.announce(msg);
    }

    fn announce(&mut self, msg: String) {
        info!("{msg}");
        self.record.chat.announce(msg);
    }
}

/// Drives matches between players reached through a [`PlayerChannel`].
///
/// A referee holds no per-match state: the same referee can run any number of matches,
/// concurrently or not.
pub struct Referee<C: PlayerChannel> {
    channel: C,
    config: Configuration,
}

impl<C: PlayerChannel> Referee<C> {
    /// Create a [`Referee`] reaching players through `channel`.
    ///
    /// Installs the file logger if enabled in `config`.
    pub fn new(channel: C, config: Configuration) -> Referee<C> {
        if config.log {
            if let Err(e) = init_logger() {
                eprintln!("referee logs disabled: {e:#}");
            }
        }
        trace!(?config);
        Referee { channel, config }
    }

    /// Transport used to reach players
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Timing parameters used for every match
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Plays the match described by `record` until it is finished.
    ///
    /// Returns [`RunOutcome::NotStarted`] without touching the record if a player does not
    /// answer the liveness check. Otherwise the record is filled as the match goes and is
    /// [`Done`](MatchStatus::Done) when this returns.
    ///
    /// # Errors
    /// If the record is not pending, does not hold exactly two players, or if the game
    /// engine does not respect its contract (invalid seat, state that cannot be serialized).
    /// When the engine misbehaves after the match started, the record is first closed as a
    /// draw, so it is always [`Done`](MatchStatus::Done) once the match started.
    #[instrument(skip_all, fields(match_id = record.id()))]
    pub async fn run<E: GameEngine>(
        &self,
        engine: &E,
        record: &mut MatchRecord<C::Handle>,
    ) -> anyhow::Result<RunOutcome> {
        ensure!(
            record.status() == MatchStatus::Pending,
            "match {} was already started",
            record.id()
        );
        ensure!(
            record.players().len() == 2,
            "a match needs exactly 2 players, got {}",
            record.players().len()
        );

        let alive = join_all(
            record
                .players()
                .iter()
                .map(|participant| self.channel.probe(&participant.handle)),
        )
        .await;
        if alive.iter().any(|alive| !alive) {
            info!(?alive, "a player did not answer, match not started");
            return Ok(RunOutcome::NotStarted);
        }

        let names: Vec<String> = record.players().iter().map(|p| p.name.clone()).collect();
        let players: Vec<Player<C::Handle>> = record
            .players()
            .iter()
            .enumerate()
            .map(|(seat, p)| Player::new(p.handle.clone(), p.name.clone(), seat))
            .collect();
        let state = engine.init(&names);
        ensure!(
            state.current_seat() < players.len(),
            "game engine returned an invalid first seat: {}",
            state.current_seat()
        );

        let initial = serde_json::to_value(&state).context("initial state cannot be serialized")?;

        let mut detector = CycleDetector::new();
        detector.observe(state.canonical_key());

        record.begin(initial);
        let mut session = Session {
            engine,
            record,
            players,
            state,
            detector,
        };
        info!("Match Started");

        match self.play(&mut session).await {
            Ok(termination) => {
                resolve(session.record, &session.players, termination)?;
                Ok(RunOutcome::Finished)
            }
            Err(e) => {
                error!("{e:#}");
                session.announce(format!("Match aborted: {e}"));
                resolve(session.record, &session.players, Termination::Draw)?;
                Err(e)
            }
        }
    }

    async fn play<E: GameEngine>(
        &self,
        session: &mut Session<'_, E, C::Handle>,
    ) -> anyhow::Result<Termination> {
        let mut ticker = self.ticker();
        loop {
            if let Some(loser) = session.players.iter().find(|p| p.is_eliminated()) {
                let (seat, msg) = (loser.seat, format!("{loser} has done too many bad moves"));
                warn!("{msg}");
                session.record.chat.announce(msg);
                return Ok(Termination::Win(opponent(seat)));
            }

            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let seat = session.current_seat()?;
            match self.play_turn(session, seat).await {
                TurnOutcome::Continue => continue,
                TurnOutcome::Win(winner) => {
                    ensure!(
                        winner < session.players.len(),
                        "game engine returned an invalid winner seat: {winner}"
                    );
                    return Ok(Termination::Win(winner));
                }
                TurnOutcome::Draw => return Ok(Termination::Draw),
                TurnOutcome::LoopDetected => return Ok(Termination::Win(opponent(seat))),
            }
        }
    }

    fn ticker(&self) -> Option<Interval> {
        if self.config.tick_interval.is_zero() {
            return None;
        }
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    }

    /// Asks the player at `seat` for a move and applies it.
    async fn play_turn<E: GameEngine>(
        &self,
        session: &mut Session<'_, E, C::Handle>,
        seat: usize,
    ) -> TurnOutcome {
        match self.try_play_turn(session, seat).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let name = session.players[seat].name.clone();
                let msg = match e {
                    TurnError::Transport(e) => {
                        session
                            .record
                            .set_client_status(seat, ClientStatus::Unreachable);
                        format!(
                            "{name} unavailable ({e}). Wait for {:?}",
                            self.config.retry_delay
                        )
                    }
                    e => format!(
                        "Error in the turn of {name}: {e}. Wait for {:?}",
                        self.config.retry_delay
                    ),
                };
                session.charge(seat, msg, None);
                sleep(self.config.retry_delay).await;
                TurnOutcome::Continue
            }
        }
    }

    async fn try_play_turn<E: GameEngine>(
        &self,
        session: &mut Session<'_, E, C::Handle>,
        seat: usize,
    ) -> Result<TurnOutcome, TurnError> {
        let player = &session.players[seat];
        let (name, handle) = (player.name.clone(), player.handle.clone());
        let request = serde_json::to_value(TurnRequest {
            request: "play",
            lives: player.lives(),
            errors: player.faults(),
            state: &session.state,
        })?;
        trace!(%request);

        let deadline = self.config.deadline();
        let (response, elapsed) = self.channel.exchange(&handle, &request, deadline).await?;
        trace!(%response, ?elapsed);
        session.record.set_client_status(seat, ClientStatus::Ready);

        if let Some(message) = response.get("message") {
            let text = match message {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            session.record.chat.push(name.clone(), text);
        }

        match parse_reply::<E::Move>(&response)? {
            Reply::Move(mv, raw) => {
                debug!("{name} plays {mv:?}");
                Ok(self.apply_move(session, seat, &name, mv, raw, elapsed))
            }
            Reply::GiveUp => {
                session.announce(format!("{name} gives up"));
                Ok(TurnOutcome::Win(opponent(seat)))
            }
            Reply::Other(kind) => {
                session.charge(seat, format!("response can't be {kind}"), None);
                Ok(TurnOutcome::Continue)
            }
        }
    }

    fn apply_move<E: GameEngine>(
        &self,
        session: &mut Session<'_, E, C::Handle>,
        seat: usize,
        name: &str,
        mv: E::Move,
        raw: Value,
        elapsed: Duration,
    ) -> TurnOutcome {
        match session.engine.apply(&session.state, &mv) {
            Transition::Applied(next) => {
                session.state = next;
                session.record.state = Some(session.snapshot());
                session.record.moves += 1;

                if session.detector.observe(session.state.canonical_key()) {
                    session.announce("Loop detected".to_owned());
                    return TurnOutcome::LoopDetected;
                }

                if elapsed > self.config.deadline() {
                    session.charge(
                        seat,
                        format!("{name} took too long to respond: {elapsed:?}"),
                        Some(raw),
                    );
                }
                TurnOutcome::Continue
            }
            Transition::IllegalMove(reason) => {
                session.charge(seat, format!("This is a bad move. {reason}"), Some(raw));
                TurnOutcome::Continue
            }
            Transition::Win(winner) => TurnOutcome::Win(winner),
            Transition::Draw => TurnOutcome::Draw,
        }
    }
}
