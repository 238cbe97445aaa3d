//! Simulated gateway — resolves a fixed outcome after a timer fires.
//!
//! Stands in for the intake service when no webhook is configured, and gives
//! tests a deterministic delayed response.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{IntakePayload, OutcomeKind, SubmissionGateway, SubmissionOutcome};

/// Gateway that waits `delay` on the tokio timer, then resolves `outcome`.
pub struct SimulatedGateway {
    delay: Duration,
    outcome: OutcomeKind,
    calls: AtomicUsize,
}

impl SimulatedGateway {
    pub fn new(delay: Duration, outcome: OutcomeKind) -> Self {
        Self {
            delay,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of submissions received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn submit(&self, payload: &IntakePayload) -> SubmissionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            action = %payload.action,
            delay_ms = self.delay.as_millis() as u64,
            outcome = %self.outcome,
            "Simulating intake submission"
        );

        tokio::time::sleep(self.delay).await;

        match self.outcome {
            OutcomeKind::Success => SubmissionOutcome::Success {
                server_message: Some("Simulated intake accepted the trip".to_string()),
            },
            OutcomeKind::Failure => SubmissionOutcome::Failure {
                reason: "Simulated intake failure".to_string(),
            },
        }
    }
}
