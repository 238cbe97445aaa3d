//! JSON body posted to the intake service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialogue::AnsweredRecord;

/// Payload fields that no slot may fill directly.
pub const RESERVED_KEYS: &[&str] = &["travelers", "trip_summary"];

/// Slot keys that map onto named `TripDetails` fields. Any other slot is
/// carried in `TripDetails::extra`.
const KNOWN_KEYS: &[&str] = &[
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
];

/// Identity of one traveler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub fullname: String,
    pub email: String,
    pub phone: String,
}

/// Everything the intake service needs to plan a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetails {
    pub travelers: Vec<Traveler>,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub num_travelers: String,
    pub budget_range: String,
    pub trip_type: String,
    pub accommodation: String,
    pub transportation: String,
    pub activities: String,
    pub additional_info: String,
    pub trip_summary: String,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl TripDetails {
    /// Map answered slots onto trip fields. Missing slots become empty
    /// strings.
    pub fn from_record(record: &AnsweredRecord, trip_summary: &str) -> Self {
        let get = |key: &str| record.get(key).unwrap_or_default().to_string();

        let extra = record
            .iter()
            .filter(|(k, _)| !KNOWN_KEYS.contains(k) && !RESERVED_KEYS.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            travelers: vec![Traveler {
                fullname: get("fullname"),
                email: get("email"),
                phone: get("phone"),
            }],
            destination: get("destination"),
            start_date: get("start_date"),
            end_date: get("end_date"),
            num_travelers: get("num_travelers"),
            budget_range: get("budget_range"),
            trip_type: get("trip_type"),
            accommodation: get("accommodation"),
            transportation: get("transportation"),
            activities: get("activities"),
            additional_info: get("additional_info"),
            trip_summary: trip_summary.to_string(),
            extra,
        }
    }
}

/// Top-level intake request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakePayload {
    pub action: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    pub form_state: TripDetails,
}

impl IntakePayload {
    pub fn new(action: impl Into<String>, submitted_at: DateTime<Utc>, form_state: TripDetails) -> Self {
        Self {
            action: action.into(),
            submitted_at,
            form_state,
        }
    }

    /// Build the payload for a completed dialogue.
    pub fn from_record(
        action: impl Into<String>,
        submitted_at: DateTime<Utc>,
        record: &AnsweredRecord,
        trip_summary: &str,
    ) -> Self {
        Self::new(
            action,
            submitted_at,
            TripDetails::from_record(record, trip_summary),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_record() -> AnsweredRecord {
        let mut record = AnsweredRecord::default();
        for (k, v) in [
            ("fullname", "Alice"),
            ("email", "a@x.com"),
            ("phone", "555"),
            ("destination", "Paris"),
            ("start_date", "2025-06-01"),
            ("end_date", "2025-06-10"),
            ("num_travelers", "2"),
        ] {
            record.bind(k, v).unwrap();
        }
        record
    }

    #[test]
    fn payload_matches_intake_shape() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 9, 30, 0).unwrap();
        let payload = IntakePayload::from_record("start_planning", at, &sample_record(), "summary");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["action"], "start_planning");
        assert_eq!(json["submittedAt"], "2025-05-01T09:30:00Z");
        let form = &json["form_state"];
        assert_eq!(form["travelers"][0]["fullname"], "Alice");
        assert_eq!(form["travelers"][0]["email"], "a@x.com");
        assert_eq!(form["travelers"][0]["phone"], "555");
        assert_eq!(form["destination"], "Paris");
        assert_eq!(form["start_date"], "2025-06-01");
        assert_eq!(form["end_date"], "2025-06-10");
        assert_eq!(form["num_travelers"], "2");
        assert_eq!(form["trip_summary"], "summary");
        // Unanswered slots are empty strings, never absent.
        assert_eq!(form["budget_range"], "");
        assert_eq!(form["additional_info"], "");
    }

    #[test]
    fn unknown_slots_are_flattened_into_form_state() {
        let mut record = AnsweredRecord::default();
        record.bind("destination", "Lisbon").unwrap();
        record.bind("dietary", "vegetarian").unwrap();

        let details = TripDetails::from_record(&record, "");
        assert_eq!(details.extra.get("dietary").map(String::as_str), Some("vegetarian"));

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["dietary"], "vegetarian");
        assert_eq!(json["destination"], "Lisbon");
    }

    #[test]
    fn reserved_answers_never_duplicate_payload_fields() {
        let mut record = AnsweredRecord::default();
        record.bind("destination", "Oslo").unwrap();
        record.bind("trip_summary", "user typed this").unwrap();
        record.bind("travelers", "3 adults").unwrap();

        let payload = IntakePayload::from_record("start_planning", Utc::now(), &record, "GENERATED");
        let body = serde_json::to_string(&payload).unwrap();

        assert_eq!(body.matches("\"trip_summary\"").count(), 1);
        assert_eq!(body.matches("\"travelers\"").count(), 1);
        assert_eq!(payload.form_state.trip_summary, "GENERATED");
        assert!(payload.form_state.extra.is_empty());
    }

    #[test]
    fn no_extra_key_when_schema_is_the_trip_schema() {
        let details = TripDetails::from_record(&sample_record(), "");
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("extra").is_none());
        assert_eq!(json.as_object().unwrap().len(), 12);
    }
}
