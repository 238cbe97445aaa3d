//! Dialogue state machine — which slot is active and what has been collected.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::gateway::OutcomeKind;

/// The phases of an intake dialogue.
///
/// Progresses linearly: Collecting → Submitting → Done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "outcome")]
pub enum DialoguePhase {
    /// Waiting for the answer to the slot at the cursor.
    #[default]
    Collecting,
    /// Every slot is answered and the intake call is in flight.
    Submitting,
    /// The intake call resolved. Terminal.
    Done(OutcomeKind),
}

impl DialoguePhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialoguePhase) -> bool {
        use DialoguePhase::*;
        matches!(
            (self, target),
            (Collecting, Submitting) | (Submitting, Done(_))
        )
    }

    /// Whether this phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting => write!(f, "collecting"),
            Self::Submitting => write!(f, "submitting"),
            Self::Done(outcome) => write!(f, "done({outcome})"),
        }
    }
}

/// Answers keyed by slot, in the order they were bound.
///
/// Each key is bound at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnsweredRecord {
    entries: Vec<(String, String)>,
}

impl AnsweredRecord {
    /// Bind `value` to `key`. Fails if the key already has an answer.
    pub fn bind(&mut self, key: &str, value: impl Into<String>) -> Result<(), String> {
        if self.contains(key) {
            return Err(format!("Slot '{key}' is already answered"));
        }
        self.entries.push((key.to_string(), value.into()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for AnsweredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Snapshot of a dialogue's progress.
///
/// `answers.len() == cursor` holds after every operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineState {
    /// Index of the next unanswered slot.
    pub cursor: usize,
    pub answers: AnsweredRecord,
    pub phase: DialoguePhase,
}

impl EngineState {
    /// All slots answered. Equivalent to `cursor == slot_count`.
    pub fn completed(&self) -> bool {
        !matches!(self.phase, DialoguePhase::Collecting)
    }

    /// The intake call is in flight; answers are refused.
    pub fn pending(&self) -> bool {
        matches!(self.phase, DialoguePhase::Submitting)
    }

    /// Move to `target`, enforcing the transition table.
    pub fn transition(&mut self, target: DialoguePhase) -> Result<(), String> {
        if !self.phase.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.phase, target));
        }
        self.phase = target;
        Ok(())
    }
}
