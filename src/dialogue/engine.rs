//! DialogueEngine — drives one intake conversation from first prompt to
//! submission outcome.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::gateway::{IntakePayload, SubmissionGateway, SubmissionOutcome};

use super::log::{ConversationLog, Speaker, Turn};
use super::prompts;
use super::schema::SlotSchema;
use super::state::{DialoguePhase, EngineState};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Why an answer was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Empty or whitespace-only input.
    Blank,
    /// The intake call is in flight.
    Submitting,
    /// The dialogue already has its outcome.
    Completed,
}

/// What `submit_answer` produced.
#[derive(Debug)]
pub enum Reply {
    /// The next question, already appended to the log.
    Prompt(Turn),
    /// Every slot is filled. The summary turn is logged and the intake call
    /// is running; `ticket` resolves to the outcome turn.
    Pending {
        summary: Turn,
        ticket: SubmissionTicket,
    },
    /// No turn appended, no state change.
    Ignored(IgnoreReason),
}

/// Handle on an in-flight submission. Resolves exactly once.
#[derive(Debug)]
pub struct SubmissionTicket {
    handle: JoinHandle<Option<Turn>>,
}

impl SubmissionTicket {
    /// Wait for the outcome turn. `None` if the outcome was already recorded
    /// or the submission task died.
    pub async fn wait(self) -> Option<Turn> {
        match self.handle.await {
            Ok(turn) => turn,
            Err(e) => {
                error!(error = %e, "Submission task failed to complete");
                None
            }
        }
    }
}

struct Inner {
    state: EngineState,
    log: ConversationLog,
}

/// One conversation's slot-filling state machine.
///
/// State and log sit behind a single mutex, so answers and the submission
/// result are applied one at a time and log appends follow that order.
pub struct DialogueEngine {
    id: Uuid,
    schema: SlotSchema,
    gateway: Arc<dyn SubmissionGateway>,
    action: String,
    inner: Mutex<Inner>,
    tx: broadcast::Sender<Turn>,
}

impl DialogueEngine {
    /// Create the engine and emit the first prompt.
    ///
    /// The opening turn is returned rather than broadcast, since nobody can
    /// have subscribed yet.
    pub fn start(
        schema: SlotSchema,
        gateway: Arc<dyn SubmissionGateway>,
        action: impl Into<String>,
    ) -> (Arc<Self>, Turn) {
        let mut log = ConversationLog::new();
        let opening = log.append(Speaker::Assistant, schema[0].prompt.clone());
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);

        let engine = Arc::new(Self {
            id: Uuid::new_v4(),
            schema,
            gateway,
            action: action.into(),
            inner: Mutex::new(Inner {
                state: EngineState::default(),
                log,
            }),
            tx,
        });

        info!(
            conversation_id = %engine.id,
            slots = engine.schema.slot_count(),
            gateway = engine.gateway.name(),
            "Dialogue started"
        );

        (engine, opening)
    }

    pub fn conversation_id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &SlotSchema {
        &self.schema
    }

    /// Subscribe to every turn appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Turn> {
        self.tx.subscribe()
    }

    /// Snapshot of the log.
    pub async fn current_log(&self) -> Vec<Turn> {
        self.inner.lock().await.log.all().to_vec()
    }

    /// Snapshot of the state.
    pub async fn state(&self) -> EngineState {
        self.inner.lock().await.state.clone()
    }

    /// Accept the user's answer to the active slot.
    ///
    /// Blank input, input while submitting, and input after the outcome are
    /// dropped. The raw text (untrimmed) is both logged and bound.
    pub async fn submit_answer(self: &Arc<Self>, text: &str) -> Reply {
        let mut inner = self.inner.lock().await;

        match inner.state.phase {
            DialoguePhase::Collecting => {}
            DialoguePhase::Submitting => {
                debug!(conversation_id = %self.id, "Answer ignored while submission is pending");
                return Reply::Ignored(IgnoreReason::Submitting);
            }
            DialoguePhase::Done(_) => {
                debug!(conversation_id = %self.id, "Answer ignored after completion");
                return Reply::Ignored(IgnoreReason::Completed);
            }
        }

        if text.trim().is_empty() {
            debug!(conversation_id = %self.id, "Blank answer ignored");
            return Reply::Ignored(IgnoreReason::Blank);
        }

        // Bind against the slot active when the answer was typed, before the
        // cursor moves.
        let answered = inner.state.cursor;
        let slot = &self.schema[answered];
        if let Err(e) = inner.state.answers.bind(&slot.key, text) {
            panic!("answer bound twice in conversation {}: {e}", self.id);
        }
        inner.state.cursor += 1;

        let user_turn = inner.log.append(Speaker::User, text);
        self.publish(&user_turn);

        debug!(
            conversation_id = %self.id,
            slot = %slot.key,
            cursor = inner.state.cursor,
            "Slot answered"
        );

        if inner.state.cursor < self.schema.slot_count() {
            let prompt = prompts::next_prompt(&self.schema[inner.state.cursor].prompt);
            let turn = inner.log.append(Speaker::Assistant, prompt);
            self.publish(&turn);
            return Reply::Prompt(turn);
        }

        // Last slot filled.
        if let Err(e) = inner.state.transition(DialoguePhase::Submitting) {
            panic!("conversation {}: {e}", self.id);
        }

        let summary = prompts::summary(&self.schema, &inner.state.answers);
        let summary_turn = inner.log.append(Speaker::Assistant, summary.clone());
        self.publish(&summary_turn);

        let payload =
            IntakePayload::from_record(&self.action, Utc::now(), &inner.state.answers, &summary);
        drop(inner);

        info!(
            conversation_id = %self.id,
            gateway = self.gateway.name(),
            "All slots answered, submitting trip"
        );

        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            // A panicking gateway still has to resolve the dialogue.
            let outcome = match AssertUnwindSafe(engine.gateway.submit(&payload))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(
                        conversation_id = %engine.id,
                        gateway = engine.gateway.name(),
                        "Gateway panicked during submission"
                    );
                    SubmissionOutcome::Failure {
                        reason: "gateway panicked".into(),
                    }
                }
            };
            engine.on_submission_result(outcome).await
        });

        Reply::Pending {
            summary: summary_turn,
            ticket: SubmissionTicket { handle },
        }
    }

    /// Record the submission outcome as the final assistant turn.
    ///
    /// Only the first call after entering `Submitting` has an effect; later
    /// calls (and calls before submission) return `None`.
    pub async fn on_submission_result(&self, outcome: SubmissionOutcome) -> Option<Turn> {
        let mut inner = self.inner.lock().await;

        if let Err(e) = inner.state.transition(DialoguePhase::Done(outcome.kind())) {
            debug!(conversation_id = %self.id, reason = %e, "Submission result ignored");
            return None;
        }

        let text = match &outcome {
            SubmissionOutcome::Success { server_message } => {
                info!(
                    conversation_id = %self.id,
                    server_message = ?server_message,
                    "Trip submission succeeded"
                );
                prompts::SUCCESS_MESSAGE
            }
            SubmissionOutcome::Failure { reason } => {
                warn!(
                    conversation_id = %self.id,
                    reason = %reason,
                    "Trip submission failed, showing fallback"
                );
                prompts::FALLBACK_MESSAGE
            }
        };

        let turn = inner.log.append(Speaker::Assistant, text);
        self.publish(&turn);
        Some(turn)
    }

    fn publish(&self, turn: &Turn) {
        // Ok if no presenter is listening.
        let _ = self.tx.send(turn.clone());
    }
}
