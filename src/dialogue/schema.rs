//! Slot schema: the ordered list of fields a dialogue collects.

use std::collections::HashSet;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::gateway::payload::RESERVED_KEYS;

use super::prompts;

/// One field to collect, with the question that asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub key: String,
    pub prompt: String,
}

impl SlotDefinition {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
        }
    }
}

/// Immutable, ordered slot definitions. Order is the collection order.
#[derive(Debug, Clone)]
pub struct SlotSchema {
    slots: Vec<SlotDefinition>,
}

impl SlotSchema {
    /// Build a schema, rejecting empty schemas, blank or duplicate keys, and
    /// keys the intake payload uses for its own fields.
    pub fn new(slots: Vec<SlotDefinition>) -> Result<Self, SchemaError> {
        if slots.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, slot) in slots.iter().enumerate() {
            if slot.key.trim().is_empty() {
                return Err(SchemaError::BlankKey { index });
            }
            if RESERVED_KEYS.contains(&slot.key.as_str()) {
                return Err(SchemaError::ReservedKey(slot.key.clone()));
            }
            if !seen.insert(slot.key.as_str()) {
                return Err(SchemaError::DuplicateKey(slot.key.clone()));
            }
        }

        Ok(Self { slots })
    }

    /// The 13-slot trip planning schema used by the conversational intake.
    pub fn trip_planning() -> Self {
        let slots = prompts::TRIP_SLOTS
            .iter()
            .map(|(key, prompt)| SlotDefinition::new(*key, *prompt))
            .collect();
        Self { slots }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Checked lookup.
    pub fn slot_at(&self, index: usize) -> Result<&SlotDefinition, SchemaError> {
        self.slots.get(index).ok_or(SchemaError::IndexOutOfRange {
            index,
            len: self.slots.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotDefinition> {
        self.slots.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.key.as_str())
    }
}

/// Panics on an out-of-range index, like slice indexing. Callers inside the
/// engine only index below the cursor bound.
impl Index<usize> for SlotSchema {
    type Output = SlotDefinition;

    fn index(&self, index: usize) -> &Self::Output {
        match self.slot_at(index) {
            Ok(slot) => slot,
            Err(e) => panic!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_schema_has_thirteen_unique_slots_in_order() {
        let schema = SlotSchema::trip_planning();
        assert_eq!(schema.slot_count(), 13);

        let keys: Vec<&str> = schema.keys().collect();
        assert_eq!(
            keys,
            [
                "fullname",
                "email",
                "phone",
                "destination",
                "start_date",
                "end_date",
                "num_travelers",
                "budget_range",
                "trip_type",
                "accommodation",
                "transportation",
                "activities",
                "additional_info",
            ]
        );

        // Built-in schema must pass its own validation.
        assert!(SlotSchema::new(schema.iter().cloned().collect()).is_ok());
    }

    #[test]
    fn first_prompt_greets_the_traveler() {
        let schema = SlotSchema::trip_planning();
        assert!(schema.slot_at(0).unwrap().prompt.starts_with("Hi!"));
    }

    #[test]
    fn slot_at_rejects_out_of_range() {
        let schema = SlotSchema::trip_planning();
        assert_eq!(
            schema.slot_at(13),
            Err(SchemaError::IndexOutOfRange { index: 13, len: 13 })
        );
        assert_eq!(schema.slot_at(12).unwrap().key, "additional_info");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn indexing_past_the_end_panics() {
        let schema = SlotSchema::trip_planning();
        let _ = &schema[99];
    }

    #[test]
    fn rejects_invalid_definitions() {
        assert_eq!(SlotSchema::new(vec![]).unwrap_err(), SchemaError::Empty);

        let dup = vec![SlotDefinition::new("a", "A?"), SlotDefinition::new("a", "Again?")];
        assert_eq!(
            SlotSchema::new(dup).unwrap_err(),
            SchemaError::DuplicateKey("a".into())
        );

        let blank = vec![SlotDefinition::new("a", "A?"), SlotDefinition::new("  ", "B?")];
        assert_eq!(
            SlotSchema::new(blank).unwrap_err(),
            SchemaError::BlankKey { index: 1 }
        );
    }

    #[test]
    fn rejects_keys_the_payload_owns() {
        for key in ["trip_summary", "travelers"] {
            let slots = vec![
                SlotDefinition::new("destination", "Where to?"),
                SlotDefinition::new(key, "Anything?"),
            ];
            assert_eq!(
                SlotSchema::new(slots).unwrap_err(),
                SchemaError::ReservedKey(key.into())
            );
        }
    }
}
