use std::net::SocketAddr;
use std::time::Duration;

use ai_referee::prelude::*;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::games::{init_test_logger, RockPaperScissors};

mod games;

/// Launches an agent answering every `play` request with the same hand
async fn always(hand: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut line = String::new();
                if BufReader::new(reader).read_line(&mut line).await.is_err() {
                    return;
                }
                let Ok(request) = serde_json::from_str::<Value>(&line) else {
                    return;
                };
                let reply = match request["request"].as_str() {
                    Some("ping") => json!({"response": "pong"}),
                    Some("play") => json!({"response": "move", "move": hand}),
                    _ => json!({"response": "what?"}),
                };
                let _ = writer.write_all(format!("{reply}\n").as_bytes()).await;
            });
        }
    });
    addr
}

fn config() -> Configuration {
    init_test_logger();
    Configuration::new()
        .with_move_time_limit(Duration::from_secs(1))
        .with_retry_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn rock_paper_scissors_over_tcp() {
    let rock = always("rock").await;
    let paper = always("paper").await;
    let referee = Referee::new(TcpChannel::new(), config());
    let mut record = MatchRecord::new(
        1,
        vec![("always_rock".to_owned(), rock), ("always_paper".to_owned(), paper)],
    );

    let outcome = referee
        .run(&RockPaperScissors { max_rounds: 5 }, &mut record)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Finished);
    assert_eq!(record.winner(), Some(&paper));
    assert_eq!(record.faults(), [0, 0]);
    assert_eq!(
        record.chat().last().unwrap().message,
        "Match Done. always_paper Won"
    );
}

#[tokio::test]
async fn same_hands_end_in_a_draw() {
    let first = always("scissors").await;
    let second = always("scissors").await;
    let referee = Referee::new(TcpChannel::new(), config());
    let mut record = MatchRecord::new(
        2,
        vec![("first".to_owned(), first), ("second".to_owned(), second)],
    );

    referee
        .run(&RockPaperScissors { max_rounds: 3 }, &mut record)
        .await
        .unwrap();

    assert!(record.is_done());
    assert!(record.winner().is_none());
    assert_eq!(record.moves(), 5);
}

#[tokio::test]
async fn absent_agent_prevents_start() {
    let rock = always("rock").await;
    let nobody = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let referee = Referee::new(
        TcpChannel::new().with_probe_timeout(Duration::from_millis(200)),
        config(),
    );
    let mut record = MatchRecord::new(
        3,
        vec![("always_rock".to_owned(), rock), ("nobody".to_owned(), nobody)],
    );

    let outcome = referee
        .run(&RockPaperScissors { max_rounds: 3 }, &mut record)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NotStarted);
    assert_eq!(record.status(), MatchStatus::Pending);
}
