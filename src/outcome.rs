use anyhow::{bail, Context};
use time::OffsetDateTime;
use tracing::info;

use crate::match_record::{MatchRecord, MatchStatus};
use crate::player::Player;

/// How a match ended.
///
/// Exhaustion and loops are reported as a [`Win`](Termination::Win) of the other player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Seat of the winner
    Win(usize),
    Draw,
}

/// Writes the final outcome of a match into `record`.
///
/// Sets the winner, announces the result in the chat, clears the state, stamps the end time,
/// copies the number of faults of each player and marks the record as done.
///
/// # Errors
/// If the record is already done, or if the winning seat does not exist. The record is left
/// untouched in both cases.
pub fn resolve<H: Clone>(
    record: &mut MatchRecord<H>,
    players: &[Player<H>],
    termination: Termination,
) -> anyhow::Result<()> {
    if record.is_done() {
        bail!("match {} is already finished", record.id);
    }

    let (winner, msg) = match termination {
        Termination::Win(seat) => {
            let winner = players
                .get(seat)
                .with_context(|| format!("no player at seat {seat}"))?;
            (
                Some(winner.handle.clone()),
                format!("Match Done. {} Won", winner.name),
            )
        }
        Termination::Draw => (None, "Match Done with no winner".to_owned()),
    };

    info!("{msg}");
    record.winner = winner;
    record.chat.announce(msg);
    record.state = None;
    record.end = Some(OffsetDateTime::now_utc());
    record.faults = players.iter().map(Player::fault_count).collect();
    record.status = MatchStatus::Done;
    Ok(())
}
