use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

/// One penalized event: bad move, slow answer, malformed reply, unreachable player...
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fault {
    pub message: String,
    /// State of the match when the fault was committed
    pub state: Value,
    #[serde(rename = "move")]
    pub offending_move: Option<Value>,
}

/// A participant for the duration of one match.
#[derive(Debug)]
pub struct Player<H> {
    pub handle: H,
    pub name: String,
    pub seat: usize,
    faults: Vec<Fault>,
}

impl<H> Player<H> {
    /// Number of faults that eliminates a player
    pub const MAX_LIVES: usize = 3;

    pub fn new(handle: H, name: String, seat: usize) -> Player<H> {
        Player {
            handle,
            name,
            seat,
            faults: vec![],
        }
    }

    pub fn lives(&self) -> usize {
        Self::MAX_LIVES.saturating_sub(self.faults.len())
    }

    pub fn is_eliminated(&self) -> bool {
        self.lives() == 0
    }

    pub fn fault_count(&self) -> usize {
        self.faults.len()
    }

    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    pub fn charge(&mut self, message: String, state: Value, offending_move: Option<Value>) {
        self.faults.push(Fault {
            message,
            state,
            offending_move,
        });
    }
}

impl<H> Display for Player<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
