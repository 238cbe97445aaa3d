//! Fixed wording for the trip intake dialogue.

use super::schema::SlotSchema;
use super::state::AnsweredRecord;

/// Built-in trip slots, in the order the assistant asks for them.
pub const TRIP_SLOTS: &[(&str, &str)] = &[
    (
        "fullname",
        "Hi! I'm your AI travel assistant. I'd love to help you plan your perfect trip! \
To get started, what's your full name?",
    ),
    ("email", "What's the best email address to reach you at?"),
    ("phone", "And a phone number we can call you on?"),
    ("destination", "Where would you like to go?"),
    ("start_date", "When would you like your trip to start?"),
    ("end_date", "And when will it end?"),
    ("num_travelers", "How many people will be traveling?"),
    (
        "budget_range",
        "What's your budget range? (low: $500-1500, medium: $1500-3000, high: $3000+)",
    ),
    (
        "trip_type",
        "What kind of trip is this? (Adventure, Relaxation, Cultural, Business, Romantic)",
    ),
    (
        "accommodation",
        "Where would you like to stay? (Hotel, Airbnb, Resort, Hostel)",
    ),
    (
        "transportation",
        "How would you like to get around? (Public Transport, Rental Car, Taxi/Uber, Walking)",
    ),
    (
        "activities",
        "What activities are you interested in? (Hiking, museums, food tours...)",
    ),
    (
        "additional_info",
        "Anything else we should know? Dietary restrictions, accessibility needs, special occasions...",
    ),
];

/// Prefix for every prompt after the first.
pub const NEXT_PROMPT_PREFIX: &str = "Great! ";

/// Final turn when the intake service accepted the submission.
pub const SUCCESS_MESSAGE: &str = "Your trip request has been sent to our travel planners! \
They'll be in touch soon with a personalized itinerary.";

/// Final turn when the submission could not be delivered.
pub const FALLBACK_MESSAGE: &str = "I couldn't reach our travel planners just now, but your \
trip details are saved in this conversation. Please try again in a moment.";

const SUMMARY_HEADER: &str = "Perfect! Here's a summary of your trip:";
const SUMMARY_FOOTER: &str = "I'm sending this to our travel planners now...";

/// Display labels for the trip slots. Keys not listed here render under
/// their raw key.
const SUMMARY_LABELS: &[(&str, &str)] = &[
    ("fullname", "Name"),
    ("email", "Email"),
    ("phone", "Phone"),
    ("destination", "Destination"),
    ("start_date", "Start date"),
    ("end_date", "End date"),
    ("num_travelers", "Travelers"),
    ("budget_range", "Budget"),
    ("trip_type", "Trip type"),
    ("accommodation", "Accommodation"),
    ("transportation", "Transportation"),
    ("activities", "Activities"),
    ("additional_info", "Notes"),
];

/// Prompt for the slot after the one just answered.
pub fn next_prompt(prompt: &str) -> String {
    format!("{NEXT_PROMPT_PREFIX}{prompt}")
}

fn label_for(key: &str) -> &str {
    SUMMARY_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Render the human-readable summary of every slot in schema order.
///
/// A slot with no bound value renders as an empty placeholder.
pub fn summary(schema: &SlotSchema, record: &AnsweredRecord) -> String {
    let mut parts = vec![SUMMARY_HEADER.to_string(), String::new()];

    for slot in schema.iter() {
        let value = record.get(&slot.key).unwrap_or("");
        parts.push(format!("- {}: {}", label_for(&slot.key), value));
    }

    parts.push(String::new());
    parts.push(SUMMARY_FOOTER.to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::schema::SlotDefinition;

    #[test]
    fn next_prompt_is_prefixed() {
        assert_eq!(next_prompt("Where to?"), "Great! Where to?");
    }

    #[test]
    fn every_trip_slot_has_a_label() {
        for (key, _) in TRIP_SLOTS {
            assert_ne!(label_for(key), *key, "{key} should have a display label");
        }
    }

    #[test]
    fn summary_lists_every_slot_in_order() {
        let schema = SlotSchema::trip_planning();
        let mut record = AnsweredRecord::default();
        record.bind("fullname", "Alice").unwrap();
        record.bind("email", "a@x.com").unwrap();

        let text = summary(&schema, &record);
        assert!(text.starts_with(SUMMARY_HEADER));
        assert!(text.contains("- Name: Alice"));
        assert!(text.contains("- Email: a@x.com"));
        // Unanswered slots render with an empty value.
        assert!(text.contains("- Destination: \n"));

        let name_pos = text.find("Name").unwrap();
        let notes_pos = text.find("Notes").unwrap();
        assert!(name_pos < notes_pos);
    }

    #[test]
    fn summary_falls_back_to_raw_keys() {
        let schema = SlotSchema::new(vec![SlotDefinition::new("favorite_color", "Color?")]).unwrap();
        let mut record = AnsweredRecord::default();
        record.bind("favorite_color", "teal").unwrap();

        let text = summary(&schema, &record);
        assert!(text.contains("- favorite_color: teal"));
    }
}
