#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use ai_referee::prelude::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, Registry};

/// Sequential rock-paper-scissors: seat 0 picks, then seat 1 picks and the round is settled.
///
/// A tie starts a new round. After `max_rounds` ties the game is a draw.
pub struct RockPaperScissors {
    pub max_rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    fn beats(self, other: Hand) -> bool {
        matches!(
            (self, other),
            (Hand::Rock, Hand::Scissors) | (Hand::Paper, Hand::Rock) | (Hand::Scissors, Hand::Paper)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpsState {
    pub current: usize,
    pub round: u32,
    pub first: Option<Hand>,
}

impl MatchState for RpsState {
    fn current_seat(&self) -> usize {
        self.current
    }
}

impl GameEngine for RockPaperScissors {
    type State = RpsState;
    type Move = Hand;

    fn init(&self, _players: &[String]) -> RpsState {
        RpsState {
            current: 0,
            round: 1,
            first: None,
        }
    }

    fn apply(&self, state: &RpsState, mv: &Hand) -> Transition<RpsState> {
        match state.first {
            None => Transition::Applied(RpsState {
                current: 1,
                round: state.round,
                first: Some(*mv),
            }),
            Some(first) if first.beats(*mv) => Transition::Win(0),
            Some(first) if mv.beats(first) => Transition::Win(1),
            Some(_) if state.round >= self.max_rounds => Transition::Draw,
            Some(_) => Transition::Applied(RpsState {
                current: 0,
                round: state.round + 1,
                first: None,
            }),
        }
    }
}

/// A token on a line, moved by both players in turn. It cannot go below 0 and nobody ever
/// wins, so only faults or loops end the match.
pub struct TokenLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Forward,
    Back,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineState {
    pub current: usize,
    pub position: u32,
}

impl MatchState for LineState {
    fn current_seat(&self) -> usize {
        self.current
    }
}

impl GameEngine for TokenLine {
    type State = LineState;
    type Move = Step;

    fn init(&self, _players: &[String]) -> LineState {
        LineState {
            current: 0,
            position: 0,
        }
    }

    fn apply(&self, state: &LineState, mv: &Step) -> Transition<LineState> {
        let position = match (mv, state.position) {
            (Step::Back, 0) => return Transition::IllegalMove("token is already at 0".to_owned()),
            (Step::Back, p) => p - 1,
            (Step::Forward, p) => p + 1,
        };
        Transition::Applied(LineState {
            current: (state.current + 1) % 2,
            position,
        })
    }
}

/// What a scripted player does when asked to play
pub enum Scripted {
    /// Answers immediately
    Answer(Value),
    /// Answers, reporting it took `Duration`
    Late(Value, Duration),
    Timeout,
    Unreachable,
}

pub fn play(mv: &str) -> Scripted {
    Scripted::Answer(json!({"response": "move", "move": mv}))
}

pub fn giveup() -> Scripted {
    Scripted::Answer(json!({"response": "giveup"}))
}

/// In-memory channel replaying a script for each player.
///
/// A player whose script is exhausted gives up.
#[derive(Default)]
pub struct ScriptedChannel {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    offline: HashSet<String>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, player: &str, script: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(player.to_owned(), script.into());
        self
    }

    pub fn with_offline(mut self, player: &str) -> Self {
        self.offline.insert(player.to_owned());
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, player: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|(p, _)| p == player)
            .map(|(_, request)| request)
            .collect()
    }
}

#[async_trait]
impl PlayerChannel for ScriptedChannel {
    type Handle = String;

    async fn probe(&self, player: &String) -> bool {
        !self.offline.contains(player)
    }

    async fn exchange(
        &self,
        player: &String,
        request: &Value,
        deadline: Duration,
    ) -> Result<(Value, Duration), TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((player.clone(), request.clone()));
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(player)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(giveup);
        match next {
            Scripted::Answer(response) => Ok((response, Duration::from_millis(5))),
            Scripted::Late(response, elapsed) => Ok((response, elapsed)),
            Scripted::Timeout => Err(TransportError::Timeout(deadline)),
            Scripted::Unreachable => Err(TransportError::Unreachable(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

pub fn new_record() -> MatchRecord<String> {
    MatchRecord::new(
        1,
        vec![
            ("alice".to_owned(), "alice".to_owned()),
            ("bob".to_owned(), "bob".to_owned()),
        ],
    )
}

pub fn admin_messages<H: Clone>(record: &MatchRecord<H>) -> Vec<String> {
    record
        .chat()
        .messages()
        .iter()
        .filter(|m| m.name == "Admin")
        .map(|m| m.message.clone())
        .collect()
}

/// Shows the referee events in the output of failing tests
pub fn init_test_logger() {
    let format = fmt::format()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_target(false);

    let reg = Registry::default().with(fmt::layer().event_format(format).with_test_writer());

    let _ = tracing::subscriber::set_global_default(reg);
}
