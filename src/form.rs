//! Multi-step planning form — the non-conversational entry path.
//!
//! Four steps (travelers, trip basics, preferences, details) that fill the
//! same [`TripDetails`] the dialogue produces, so both paths hand the
//! gateway one payload shape.

use chrono::{DateTime, Utc};

use crate::dialogue::{AnsweredRecord, SlotSchema, prompts};
use crate::gateway::{IntakePayload, SubmissionGateway, SubmissionOutcome, Traveler, TripDetails};

/// Number of form steps.
pub const TOTAL_STEPS: u8 = 4;

/// Per-traveler fields (step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerField {
    Fullname,
    Email,
    Phone,
}

/// Trip-level fields (steps 2-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Destination,
    NumTravelers,
    StartDate,
    EndDate,
    BudgetRange,
    TripType,
    Accommodation,
    Transportation,
    Activities,
    AdditionalInfo,
    TripSummary,
}

impl FormField {
    /// The step this field is shown on.
    pub fn step(&self) -> u8 {
        use FormField::*;
        match self {
            Destination | NumTravelers | StartDate | EndDate => 2,
            BudgetRange | TripType | Accommodation | Transportation => 3,
            Activities | AdditionalInfo | TripSummary => 4,
        }
    }
}

/// Result of pressing "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Moved to this step.
    Advanced(u8),
    /// Already on the last step; the form should be submitted.
    Submit,
}

/// In-progress form state.
#[derive(Debug, Clone)]
pub struct PlanningForm {
    step: u8,
    details: TripDetails,
}

impl Default for PlanningForm {
    fn default() -> Self {
        Self {
            step: 1,
            details: TripDetails {
                travelers: vec![Traveler::default()],
                num_travelers: "1".to_string(),
                ..Default::default()
            },
        }
    }
}

impl PlanningForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> u8 {
        self.step
    }

    pub fn details(&self) -> &TripDetails {
        &self.details
    }

    /// Progress through the form, 25 per step.
    pub fn progress_percent(&self) -> u8 {
        self.step * 100 / TOTAL_STEPS
    }

    pub fn next_step(&mut self) -> StepResult {
        if self.step < TOTAL_STEPS {
            self.step += 1;
            StepResult::Advanced(self.step)
        } else {
            StepResult::Submit
        }
    }

    /// Go back one step. No-op on the first step.
    pub fn prev_step(&mut self) -> u8 {
        if self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    pub fn add_traveler(&mut self) {
        self.details.travelers.push(Traveler::default());
    }

    /// Remove a traveler. The last remaining traveler cannot be removed.
    pub fn remove_traveler(&mut self, index: usize) -> bool {
        if self.details.travelers.len() <= 1 || index >= self.details.travelers.len() {
            return false;
        }
        self.details.travelers.remove(index);
        true
    }

    pub fn update_traveler(&mut self, index: usize, field: TravelerField, value: impl Into<String>) -> bool {
        let Some(traveler) = self.details.travelers.get_mut(index) else {
            return false;
        };
        let value = value.into();
        match field {
            TravelerField::Fullname => traveler.fullname = value,
            TravelerField::Email => traveler.email = value,
            TravelerField::Phone => traveler.phone = value,
        }
        true
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        let d = &mut self.details;
        match field {
            FormField::Destination => d.destination = value,
            FormField::NumTravelers => d.num_travelers = value,
            FormField::StartDate => d.start_date = value,
            FormField::EndDate => d.end_date = value,
            FormField::BudgetRange => d.budget_range = value,
            FormField::TripType => d.trip_type = value,
            FormField::Accommodation => d.accommodation = value,
            FormField::Transportation => d.transportation = value,
            FormField::Activities => d.activities = value,
            FormField::AdditionalInfo => d.additional_info = value,
            FormField::TripSummary => d.trip_summary = value,
        }
    }

    /// The form's answers as a dialogue record, keyed like the trip schema.
    /// Uses the first traveler's identity.
    pub fn to_record(&self) -> AnsweredRecord {
        let d = &self.details;
        let lead = d.travelers.first().cloned().unwrap_or_default();
        let values = [
            ("fullname", lead.fullname),
            ("email", lead.email),
            ("phone", lead.phone),
            ("destination", d.destination.clone()),
            ("start_date", d.start_date.clone()),
            ("end_date", d.end_date.clone()),
            ("num_travelers", d.num_travelers.clone()),
            ("budget_range", d.budget_range.clone()),
            ("trip_type", d.trip_type.clone()),
            ("accommodation", d.accommodation.clone()),
            ("transportation", d.transportation.clone()),
            ("activities", d.activities.clone()),
            ("additional_info", d.additional_info.clone()),
        ];

        let mut record = AnsweredRecord::default();
        for (key, value) in values {
            let bound = record.bind(key, value);
            debug_assert!(bound.is_ok(), "form keys are distinct: {bound:?}");
        }
        record
    }

    /// Build the intake payload. A blank trip summary is generated from the
    /// answers the same way the dialogue does.
    pub fn into_payload(self, action: impl Into<String>, submitted_at: DateTime<Utc>) -> IntakePayload {
        let mut details = self.details.clone();
        if details.trip_summary.trim().is_empty() {
            details.trip_summary = prompts::summary(&SlotSchema::trip_planning(), &self.to_record());
        }
        IntakePayload::new(action, submitted_at, details)
    }

    /// Submit through a gateway. Single attempt.
    pub async fn submit(self, gateway: &dyn SubmissionGateway, action: impl Into<String>) -> SubmissionOutcome {
        let payload = self.into_payload(action, Utc::now());
        tracing::info!(
            travelers = payload.form_state.travelers.len(),
            gateway = gateway.name(),
            "Submitting planning form"
        );
        gateway.submit(&payload).await
    }
}
