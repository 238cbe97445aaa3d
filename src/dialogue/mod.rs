//! Slot-filling dialogue — the conversational trip intake.
//!
//! The assistant asks one question per turn, binds each non-blank answer to
//! the active slot, and once every slot is filled hands the assembled record
//! to a [`SubmissionGateway`](crate::gateway::SubmissionGateway). The outcome
//! comes back as one final assistant turn.

pub mod engine;
pub mod log;
pub mod prompts;
pub mod schema;
pub mod state;

pub use engine::{DialogueEngine, IgnoreReason, Reply, SubmissionTicket};
pub use log::{ConversationLog, Speaker, Turn};
pub use schema::{SlotDefinition, SlotSchema};
pub use state::{AnsweredRecord, DialoguePhase, EngineState};
