//! CLI presenter — stdin/stdout front-end for a dialogue.

use std::io::Write;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::dialogue::{DialogueEngine, Reply, Turn};

/// How a CLI session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The dialogue reached its outcome; carries the final turn.
    Completed(Turn),
    /// Input ended (EOF or `/quit`) before the dialogue finished.
    Abandoned,
}

/// Lines typed on stdin, unmodified.
pub fn stdin_lines() -> impl Stream<Item = String> + Unpin {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "/quit" | "/exit")
}

fn show<W: Write>(out: &mut W, turn: &Turn) -> std::io::Result<()> {
    writeln!(out, "\n{}\n", turn.text)?;
    out.flush()
}

/// Print every assistant turn already published on `turns`.
///
/// The engine publishes before `submit_answer` returns and before the
/// submission task finishes, so draining after either sees those turns.
fn drain<W: Write>(turns: &mut broadcast::Receiver<Turn>, out: &mut W) -> std::io::Result<()> {
    loop {
        match turns.try_recv() {
            Ok(turn) if turn.is_user() => {}
            Ok(turn) => show(out, &turn)?,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Presenter fell behind, turns dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

/// Drive `engine` from `input`, writing assistant turns to `out`.
///
/// Output comes from the engine's turn broadcast, not from the replies.
/// Input lines go to the engine untouched; the engine decides what counts as
/// blank. Returns once the outcome turn is shown or input runs out.
pub async fn run_session<S, W>(
    engine: Arc<DialogueEngine>,
    opening: &Turn,
    mut input: S,
    out: &mut W,
) -> std::io::Result<SessionEnd>
where
    S: Stream<Item = String> + Unpin,
    W: Write,
{
    let mut turns = engine.subscribe();
    show(out, opening)?;

    while let Some(line) = input.next().await {
        if is_quit(&line) {
            break;
        }

        match engine.submit_answer(&line).await {
            Reply::Prompt(_) => drain(&mut turns, out)?,
            Reply::Ignored(reason) => {
                tracing::debug!(?reason, "Input ignored");
            }
            Reply::Pending { ticket, .. } => {
                // Summary first, then the outcome once the intake call resolves.
                drain(&mut turns, out)?;
                let outcome = ticket.wait().await;
                drain(&mut turns, out)?;
                return Ok(match outcome {
                    Some(turn) => SessionEnd::Completed(turn),
                    None => SessionEnd::Abandoned,
                });
            }
        }
    }

    tracing::info!(conversation_id = %engine.conversation_id(), "Session ended before completion");
    Ok(SessionEnd::Abandoned)
}
